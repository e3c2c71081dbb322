//! Outbound services

pub mod cloudinary;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig, CloudinaryError, UploadedImage};
