//! Content module - pages, front-matter and collections

mod collection;
mod frontmatter;
pub mod loader;
mod page;

pub use collection::{CollectionError, Collections, POSTS_TAG};
pub use frontmatter::FrontMatter;
pub use page::{NavOptIn, Page, PageType};
