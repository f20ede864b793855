//! Policy data model and action extraction.
//!
//! Policy documents follow the IAM shape
//! `{"Statement": [{"Effect": ..., "Action": ..., "Sid": ...}]}`. Only the
//! literal action strings and effects are retained; resources, conditions and
//! principals are ignored.

pub mod action;
pub mod document;

pub use action::{ActionsByEffect, ActionsBySid, actions_by_effect, actions_by_sid, normalize_action};
pub use document::{DEFAULT_SID, DocumentError, Effect, PolicyDocument, Statement};
