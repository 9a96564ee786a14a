//! Page shell: document frame, navigation bar and content wrappers

use lazy_static::lazy_static;

use super::components::Renderer;
use super::style::Style;
use crate::content::PageType;
use crate::helpers::{attributes, html_escape};
use crate::navigation::{self, Direction};

/// Base styles every page starts from
pub const PREFLIGHT: &str = concat!(
    "*,::before,::after{box-sizing:border-box;border-width:0;border-style:solid;border-color:#e5e7eb;}",
    "html{line-height:1.5;-webkit-text-size-adjust:100%;font-family:ui-sans-serif,system-ui,-apple-system,\"Segoe UI\",Roboto,\"Helvetica Neue\",Arial,sans-serif;}",
    "body{margin:0;font-family:inherit;line-height:inherit;}",
    "h1,h2,h3,h4,h5,h6{font-size:inherit;font-weight:inherit;}",
    "blockquote,dl,dd,h1,h2,h3,h4,h5,h6,hr,figure,p,pre{margin:0;}",
    "ol,ul{list-style:none;margin:0;padding:0;}",
    "a{color:inherit;text-decoration:inherit;}",
    "img{display:block;max-width:100%;height:auto;}",
    "table{text-indent:0;border-color:inherit;border-collapse:collapse;}",
    "button,input{font-family:inherit;font-size:100%;line-height:inherit;color:inherit;margin:0;padding:0;}",
    "button{cursor:pointer;background-color:transparent;background-image:none;}",
    "input::placeholder{opacity:1;color:#9ca3af;}",
    "code,pre{font-family:ui-monospace,SFMono-Regular,Menlo,Monaco,Consolas,monospace;font-size:1em;}",
    "sup{font-size:75%;line-height:0;position:relative;vertical-align:baseline;top:-0.5em;}",
    "hr{height:0;color:inherit;border-top-width:1px;}",
);

const NAV_LINK: &str =
    "inline-block text-lg py-2 leading-none border p-2 text-white border-white hover:(border-transparent text-gray-400 bg-gray-100)";
const SEARCH_CONTROL: &str = "bg-gray-800 text-lg py-2 leading-none border p-2 text-white border-white";

lazy_static! {
    static ref NAV: Style = Style::tw("grid grid-cols-3 md:grid-cols-5 gap-2 bg-gray-800 p-6");
    static ref NAV_LINK_IDLE: Style = Style::tw(NAV_LINK);
    static ref NAV_LINK_ACTIVE: Style = Style::tw(NAV_LINK).extend(Style::tw(
        "border-transparent text-gray-800 bg-white hover:(border-transparent text-gray-500 bg-white)"
    ));
    static ref SKIP_LINK: Style = Style::tw(NAV_LINK).extend(Style::tw("sr-only"));
    static ref SEARCH_FORM: Style =
        Style::tw("grid grid-cols-4 grid-column[auto / span 3] md:grid-column[auto / span 2]");
    static ref SEARCH_INPUT: Style =
        Style::tw(SEARCH_CONTROL).extend(Style::tw("grid-column[auto / span 3]"));
    static ref SEARCH_BUTTON: Style = Style::tw(SEARCH_CONTROL);
    static ref CONTAINER: Style = Style::tw("container mx-auto p-2 md:p-8 min-h-full");
    static ref ARTICLE: Style = Style::new().nest("& > *", Style::tw("mb-3"));
    static ref POST_TITLE: Style = Style::tw("text-3xl");
    static ref JUMBOTRON_CARD: Style =
        Style::tw("shadow-xl bg-white bg-opacity-80 border-gray-400 p-16 min-h-full");
    static ref POST_NAV: Style = Style::tw("grid grid-cols-1 md:grid-cols-2 gap-4 p-4");
    static ref POST_NAV_LINK: Style = Style::tw(
        "text-green-200 visited:text-green-600 inline-block text-sm px-4 py-2 leading-none border rounded text-center"
    );
}

/// Wrap rendered body content in the full document
pub fn render(r: &Renderer<'_>, body: &str) -> String {
    let ctx = r.ctx;
    let page = ctx.page;
    r.global(PREFLIGHT);

    let title = page.title.as_deref().unwrap_or(&ctx.metadata.title);
    let description = page
        .description
        .as_deref()
        .or(Some(ctx.metadata.description.as_str()).filter(|d| !d.is_empty()))
        .unwrap_or(&ctx.metadata.title);

    let mut html = String::from(r#"<!DOCTYPE html><html lang="en"><head>"#);
    html.push_str(&format!("<title>{}</title>", html_escape(title)));
    html.push_str(r#"<meta charset="utf-8" />"#);
    html.push_str(&format!(
        "<meta{} />",
        attributes([("name", "description"), ("content", description)])
    ));
    html.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1" />"#);
    html.push_str("</head><body>");

    let jumbotron = page.page_type == PageType::Jumbotron;
    if jumbotron {
        let background = Style::new()
            .decl(
                "background-image",
                &format!("url(\"{}\")", ctx.jumbotron_image),
            )
            .extend(Style::tw("min-h-screen bg-center bg-cover bg-fixed"));
        html.push_str(&format!("<div{}>", r.class_attr(&background)));
    }

    html.push_str(&nav_bar(r));
    html.push_str(&format!("<div{}>", r.class_attr(&CONTAINER)));
    match page.page_type {
        PageType::Post => {
            html.push_str(&format!(r#"<article id="main"{}>"#, r.class_attr(&ARTICLE)));
            html.push_str(&format!(
                "<h1{}>{}</h1>",
                r.class_attr(&POST_TITLE),
                html_escape(page.title.as_deref().unwrap_or_default())
            ));
            html.push_str(body);
            html.push_str("</article>");
            html.push_str(&post_nav(r));
        }
        PageType::Jumbotron => {
            html.push_str(&format!(r#"<main id="main"{}>"#, r.class_attr(&JUMBOTRON_CARD)));
            html.push_str(body);
            html.push_str("</main>");
        }
        PageType::Plain => {
            html.push_str(r#"<div id="main">"#);
            html.push_str(body);
            html.push_str("</div>");
        }
    }
    html.push_str("</div>");

    if jumbotron {
        html.push_str("</div>");
    }
    html.push_str("</body></html>");
    html
}

fn nav_bar(r: &Renderer<'_>) -> String {
    let ctx = r.ctx;
    let mut html = format!("<nav{}>", r.class_attr(&NAV));
    for item in navigation::nav_list(&ctx.collections.nav, &ctx.page.url) {
        let style: &Style = if item.active {
            &NAV_LINK_ACTIVE
        } else {
            &NAV_LINK_IDLE
        };
        html.push_str(&format!(
            "<a{}{}>{}</a>",
            attributes([("href", item.entry.url.as_str())]),
            r.class_attr(style),
            html_escape(&item.entry.key)
        ));
    }

    let skip_class = match r.class(&SKIP_LINK) {
        Some(class) => format!("skip-link {}", class),
        None => "skip-link".to_string(),
    };
    html.push_str(&format!(
        "<a{}>Skip to main</a>",
        attributes([("href", "#main"), ("class", skip_class.as_str())])
    ));

    html.push_str(&format!(
        r#"<form method="get" target="_self" action="/search"{}>"#,
        r.class_attr(&SEARCH_FORM)
    ));
    html.push_str(&format!(
        r#"<input name="q" type="text" placeholder="Search..."{} />"#,
        r.class_attr(&SEARCH_INPUT)
    ));
    html.push_str(&format!(
        "<button{}>🔍</button>",
        r.class_attr(&SEARCH_BUTTON)
    ));
    html.push_str("</form></nav>");
    html
}

/// Previous/next links within the posts collection
fn post_nav(r: &Renderer<'_>) -> String {
    format!(
        "<nav{}>{}{}</nav>",
        r.class_attr(&POST_NAV),
        post_nav_link(r, Direction::Previous),
        post_nav_link(r, Direction::Next)
    )
}

fn post_nav_link(r: &Renderer<'_>, direction: Direction) -> String {
    let ctx = r.ctx;
    let posts = &ctx.collections.posts;
    let lookup = match direction {
        Direction::Previous => ctx.helpers.get_previous_collection_item(posts, ctx.page),
        Direction::Next => ctx.helpers.get_next_collection_item(posts, ctx.page),
    };
    let neighbour = match lookup {
        Ok(Some(neighbour)) => neighbour,
        Ok(None) => return "<span></span>".to_string(),
        Err(e) => {
            tracing::debug!("No post navigation for {}: {}", ctx.page.url, e);
            return String::new();
        }
    };

    let label = html_escape(neighbour.link_text());
    let text = match direction {
        Direction::Previous => {
            format!(r#"<span role="img" aria-label="Arrow Back">← </span>{}"#, label)
        }
        Direction::Next => {
            format!(r#"{}<span role="img" aria-label="Right Arrow"> →</span>"#, label)
        }
    };
    format!(
        "<a{}{}>{}</a>",
        attributes([("href", neighbour.url.as_str())]),
        r.class_attr(&POST_NAV_LINK),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use crate::content::{Page, PageType};
    use chrono::{TimeZone, Utc};

    fn post(url: &str, title: &str, day: u32) -> Page {
        Page::new(url, "Body")
            .with_title(title)
            .with_type(PageType::Post)
            .with_tags(["posts"])
            .with_date(Utc.with_ymd_and_hms(2021, 3, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_document_frame() {
        let page = Page::new("/about/", "Hi").with_title("About <me>");
        let fixture = Fixture::with_pages(vec![page]);
        let html = fixture.render_shell("/about/", "<p>Hi</p>");
        assert!(html.starts_with(r#"<!DOCTYPE html><html lang="en"><head><title>About &lt;me&gt;</title>"#));
        assert!(html.contains(r#"<meta name="description" content="My Site" />"#));
        assert!(html.contains(r#"<meta name="viewport" content="width=device-width, initial-scale=1" />"#));
        assert!(html.contains(r#"<div id="main"><p>Hi</p></div>"#));
        assert!(html.contains(r##"<a href="#main" class="skip-link c-"##));
        assert!(html.contains(r#"action="/search""#));
        assert!(html.contains(r#"<input name="q""#));
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_nav_bar_sorted_with_active_entry() {
        let pages = vec![
            Page::new("/blog/", "").with_nav("Blog", 2.0),
            Page::new("/", "").with_nav("Home", 1.0),
            Page::new("/about/", "").with_nav("About", 3.0),
        ];
        let fixture = Fixture::with_pages(pages);
        let html = fixture.render_shell("/blog/", "");

        let home = html.find(">Home</a>").unwrap();
        let blog = html.find(">Blog</a>").unwrap();
        let about = html.find(">About</a>").unwrap();
        assert!(home < blog && blog < about);

        let class_of = |key: &str| {
            let end = html.find(&format!(">{}</a>", key)).unwrap();
            let start = html[..end].rfind("class=\"").unwrap() + 7;
            html[start..end - 1].to_string()
        };
        assert_ne!(class_of("Blog"), class_of("Home"));
        assert_eq!(class_of("Home"), class_of("About"));
    }

    #[test]
    fn test_post_wrapper_and_navigation() {
        let pages = vec![
            post("/posts/a/", "First", 1),
            post("/posts/b/", "Second", 2),
            post("/posts/c/", "Third", 3),
        ];
        let fixture = Fixture::with_pages(pages);

        let middle = fixture.render_shell("/posts/b/", "<p>Body</p>");
        assert!(middle.contains(r#"<article id="main" class="c-"#));
        assert!(middle.contains(">Second</h1><p>Body</p></article>"));
        assert!(middle.contains(r#"<span role="img" aria-label="Arrow Back">← </span>First</a>"#));
        assert!(middle.contains(r#"Third<span role="img" aria-label="Right Arrow"> →</span></a>"#));

        let first = fixture.render_shell("/posts/a/", "");
        assert!(first.contains("><span></span><a href=\"/posts/b/\""));

        let last = fixture.render_shell("/posts/c/", "");
        assert!(last.contains("</a><span></span></nav>"));
    }

    #[test]
    fn test_post_outside_collection_has_empty_nav() {
        let fixture = Fixture::with_pages(vec![post("/posts/a/", "First", 1)]);
        let mut stray = Page::new("/stray/", "").with_type(PageType::Post);
        stray.title = Some("Stray".to_string());
        let html = fixture.render_shell_for(&stray, "");
        assert!(html.contains("</article><nav class=\"c-"));
        assert!(!html.contains("<span></span>"));
    }

    #[test]
    fn test_jumbotron_background() {
        let page = Page::new("/", "").with_type(PageType::Jumbotron);
        let fixture = Fixture::with_pages(vec![page]);
        let (html, css) = fixture.render_shell_with_styles("/", "<p>Hero</p>");
        assert!(html.contains(r#"<main id="main" class="c-"#));
        assert!(css.contains(r#"background-image:url("/img/desert.jpg")"#));
        assert!(html.ends_with("</main></div></div></body></html>"));
    }
}
