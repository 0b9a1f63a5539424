//! Tests for recurrence matching, templates, tasks, and generation.

mod domain_tests;
