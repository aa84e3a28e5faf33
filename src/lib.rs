//! Workspace root package.
//!
//! Exists so workspace-level dev tooling (the `rusty-hook` pre-commit hook)
//! has a package to attach to. The library and CLI live under `crates/`.
