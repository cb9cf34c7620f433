//! Terrarium Engine - Remote imagery acquisition, derivation and export
//!
//! This crate talks to the Earth Engine REST API. Images and collections are
//! handles over lazily-evaluated expression graphs; only the operations that
//! need an answer (dates, footprints, exports, task status) reach the
//! platform, through the [`ImageryPlatform`] port held by a [`Session`].

pub mod acquisition;
pub mod auth;
pub mod client;
pub mod dates;
pub mod export;
pub mod expression;
pub mod geocoding;
pub mod http;
pub mod image;
pub mod palette;
pub mod ports;
pub mod secrets;
pub mod session;
pub mod spectral;

pub use acquisition::{find_covering_image, find_latest_date, image_identifier};
pub use client::EarthEngineClient;
pub use dates::extract_sorted_dates;
pub use export::{export_image, job_status, ExportRequest, JobStatus};
pub use expression::Expr;
pub use geocoding::GoogleGeocoder;
pub use image::{CollectionHandle, ImageHandle, Reprojection};
pub use ports::ImageryPlatform;
pub use secrets::SecretManagerClient;
pub use session::{initialize, CredentialSource, Session, SessionSettings};
pub use spectral::{generate_spectral_image, ndvi, raw_ndvi, true_color};
