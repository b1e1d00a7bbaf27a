//! Salary Slip Generation Engine
//!
//! This crate generates periodic salary slips for every active employee of a
//! payroll system. For each employee it decides whether a slip already exists,
//! derives a base from an explicit amount or from slip history, folds in
//! operator-maintained percentage overrides, and submits the result through a
//! [`backend::PayrollBackend`].

#![warn(missing_docs)]

pub mod adjustment;
pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
