//! Income scoring service for loan applications.
//!
//! Orchestrates the prediction pipeline: fetch a stored application,
//! build its feature vector, run the pretrained model, persist the
//! structured output. Batch mode drives the same path over every eligible
//! un-scored application with per-item fault isolation.

pub mod commands;
pub mod predictor;
