//! Configuration module

mod site;

pub use site::ApiConfig;
pub use site::CommentsConfig;
pub use site::PreviewConfig;
pub use site::SiteConfig;
