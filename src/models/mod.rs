// src/models/mod.rs

pub mod answer;
pub mod assessment;
pub mod attempt;
pub mod question;
pub mod result;
