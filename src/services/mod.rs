// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod gallery_query;
pub mod gallery_service;
pub mod gallery_write_pipeline;
pub mod media_resolver;


pub use gallery_query::{ListRequest, ListRules, RawParams, COUNT_PARAM, ORDER_BY_PARAM, PAGE_PARAM};
pub use gallery_service::{DeleteAck, GalleryService};
pub use gallery_write_pipeline::{GalleryCandidate, GalleryWritePipeline, RawInput};
pub use media_resolver::MediaReferenceResolver;
