/*
 * This module provides the application logic layer, centered around
 * `OutlineAppLogic`, which acts as the Presenter/Controller between a host
 * (rendering and user input) and the core editor state. The host-facing event
 * and command types live in `types`, the input abstraction in `input_provider`.
 * Unit tests for `OutlineAppLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod input_provider;
pub mod types;
pub mod ui_constants;
