//! MDX components available to page bodies

use lazy_static::lazy_static;

use super::components::{Registry, Renderer};
use super::style::Style;
use super::RenderError;
use crate::helpers::{attributes, html_escape};

lazy_static! {
    static ref POST_GRID: Style =
        Style::tw("grid grid-cols-1 md:grid-cols-2 gap-4 lg:grid-cols-4 xl:grid-cols-6");
    static ref POST_CARD: Style =
        Style::tw("bg-amazon-20 rounded-md flex items-center flex-col justify-center p-4");
    static ref POST_TITLE: Style = Style::tw("text-xl");
    static ref POST_DATE: Style = Style::tw("text-sm text-gray-600");
    static ref POST_DESCRIPTION: Style = Style::tw("text-sm");
    static ref TOC_BOX: Style = Style::tw("flex flex-col border border-gray-600 p-3");
    static ref TOC_TITLE: Style = Style::tw("text-gray-600");
}

/// Render the component `name`; unknown components render nothing
pub fn render(r: &Renderer<'_>, name: &str, out: &mut String) -> Result<(), RenderError> {
    match name {
        "PostList" => post_list(r, out),
        "TableOfContents" => table_of_contents(r, out),
        _ => {
            tracing::debug!("Unknown component <{} /> in {}", name, r.ctx.page.url);
            Ok(())
        }
    }
}

/// Grid of cards linking to every post
fn post_list(r: &Renderer<'_>, out: &mut String) -> Result<(), RenderError> {
    let nested = r.nested(Registry::shared_content());

    out.push_str("<div");
    out.push_str(&r.class_attr(&POST_GRID));
    out.push('>');
    for post in &r.ctx.collections.posts {
        out.push_str("<a");
        out.push_str(&attributes([("href", post.url.as_str())]));
        out.push_str(&r.class_attr(&POST_CARD));
        out.push('>');

        out.push_str("<h4");
        out.push_str(&r.class_attr(&POST_TITLE));
        out.push('>');
        out.push_str(&html_escape(post.title.as_deref().unwrap_or_default()));
        out.push_str("</h4>");

        let helpers = r.ctx.helpers;
        out.push_str("<time");
        out.push_str(&attributes([("datetime", helpers.html_date_string(&post.date).as_str())]));
        out.push_str(&r.class_attr(&POST_DATE));
        out.push('>');
        out.push_str(&helpers.readable_date(&post.date));
        out.push_str("</time>");

        out.push_str("<p");
        out.push_str(&r.class_attr(&POST_DESCRIPTION));
        out.push('>');
        out.push_str(&html_escape(post.description.as_deref().unwrap_or_default()));
        out.push_str("</p>");

        if let Some(excerpt) = &post.excerpt {
            nested.render_markdown(excerpt, out)?;
        }
        out.push_str("</a>");
    }
    out.push_str("</div>");
    Ok(())
}

/// Links to every heading of the current page
fn table_of_contents(r: &Renderer<'_>, out: &mut String) -> Result<(), RenderError> {
    let ctx = r.ctx;
    let item = ctx
        .helpers
        .get_collection_item(&ctx.collections.all, ctx.page)
        .ok_or_else(|| RenderError::MissingCollectionItem(ctx.page.url.clone()))?;

    out.push_str("<div");
    out.push_str(&r.class_attr(&TOC_BOX));
    out.push_str("><h4");
    out.push_str(&r.class_attr(&TOC_TITLE));
    out.push_str(">Table of contents</h4>");
    r.nested(Registry::shared_table_of_contents())
        .render_markdown(&item.body, out)?;
    out.push_str("</div>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use crate::content::{Collections, Page, PageType};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_table_of_contents() {
        let body = "<TableOfContents />\n\n# Intro\n\nText\n\n## Details {#more}\n\n### Deep\n";
        let page = Page::new("/guide/", body).with_title("Guide");
        let fixture = Fixture::with_pages(vec![page]);
        let html = fixture.render_body(body);

        let toc_start = html.find("Table of contents</h4>").unwrap();
        let toc = &html[toc_start..];
        assert!(toc.contains(r##"<a href="#intro" class="c-"##));
        assert!(toc.contains(r##"<a href="#more" class="c-"##));
        assert!(toc.contains(r##"<a href="#deep" class="c-"##));
        // Paragraphs are not part of the table of contents
        assert!(!html[..html.find("<h1").unwrap()].contains("Text"));
        // The TableOfContents tag in the nested render does not recurse
        assert_eq!(html.matches("Table of contents").count(), 1);
    }

    #[test]
    fn test_table_of_contents_outside_collection_fails() {
        let page = Page::new("/hidden/", "<TableOfContents />\n");
        let mut fixture = Fixture::with_pages(vec![page]);
        fixture.collections = Collections::default();
        let err = fixture.try_render_body("<TableOfContents />\n").unwrap_err();
        assert!(err.to_string().contains("/hidden/"));
    }

    #[test]
    fn test_post_list() {
        let mut first = Page::new("/posts/one/", "Body one")
            .with_title("One")
            .with_type(PageType::Post)
            .with_tags(["posts"])
            .with_date(Utc.with_ymd_and_hms(2021, 3, 4, 12, 0, 0).unwrap());
        first.description = Some("First <post>".to_string());
        first.excerpt = Some("Excerpt *one* <PostList />".to_string());
        let second = Page::new("/posts/two/", "Body two")
            .with_title("Two")
            .with_type(PageType::Post)
            .with_tags(["posts"]);
        let index = Page::new("/", "<PostList />\n");

        let fixture = Fixture::with_pages(vec![first, second, index]);
        let html = fixture.render_body("<PostList />\n");

        assert!(html.contains(r#"<a href="/posts/one/" class="c-"#));
        assert!(html.contains(r#"<a href="/posts/two/" class="c-"#));
        assert!(html.contains("First &lt;post&gt;"));
        assert!(html.contains("<em class=\"c-"));
        assert!(html.contains(r#"<time datetime="2021-03-04" class="c-"#));
        assert!(html.contains(">04 Mar 2021</time>"));
        assert_eq!(html.matches("/posts/one/").count(), 1);
    }
}
