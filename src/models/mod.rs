// src/models/mod.rs

pub mod course;
pub mod enrollment;
pub mod profile;
pub mod quiz;
pub mod role_detail;
pub mod user;
