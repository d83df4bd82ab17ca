// src/models/mod.rs

pub mod account;
pub mod achievement;
pub mod exam;
pub mod exam_result;
pub mod exercise;
pub mod lesson;
pub mod person;
pub mod post;
