//! Content backend module - the HTTP client and its wire types

mod client;
mod document;

pub use client::{ApiClient, ApiError, QueryOptions};
pub use document::{
    ApiInfo, ApiRef, Banner, BodySpan, ContentSection, Document, DocumentData, QueryResponse,
};
