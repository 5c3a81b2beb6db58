//! Consolidated test modules.
//!
//! This module contains end-to-end tests that run a full sweep against an
//! in-memory database, a mock helpdesk, and an in-memory work queue.
