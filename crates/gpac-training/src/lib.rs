//! Construction of strategy trees for the G-Pac evaluator.
//!
//! Strategies are [`ExprNode`](gpac_evaluator::expr_tree::ExprNode) trees over the
//! feature symbols of [`gpac_evaluator::state_feature`] and the arithmetic operators of
//! [`gpac_evaluator::expr_tree::Operator`]. This crate builds the initial random
//! trees that an evolutionary search would start from.
//!
//! # Architecture
//!
//! ```text
//! Tree Generator (full / grow)
//!     ↓ builds
//! Expression Tree (strategy)
//!     ↓ played by
//! Episode Evaluation (gpac-evaluator)
//!     ↓ produces
//! Score
//! ```
//!
//! See the [`tree_generator`] module for the generation policies.

pub mod tree_generator;
