//! Manifest templating for Kubernetes resources.
//!
//! This module turns reusable YAML fragments into parsed manifest documents.
//! A template is a named, ordered list of fragment files; each fragment is
//! rendered with Tera and split into `---`-separated documents.
//!
//! # Overview
//!
//! - [`TemplateComposer`] reads `.devops/manifests/_index.yaml` once and
//!   renders a template's fragments in index order
//! - [`apply_overrides`] renders a workspace's own `manifests/` folder and
//!   deep-merges it over the composed documents
//! - [`ManifestDocument`] is a parsed document known to carry a `kind` and a
//!   `metadata.name`; [`ResourceKey`] is that identity
//!
//! # Template Syntax
//!
//! - Variable substitution: `{{ namespace }}`
//! - Conditional logic: `{% if port %}...{% endif %}`
//! - Loops: `{% for job in cron_jobs %}...{% endfor %}`
//! - Standard Tera filters
//!
//! Referencing a variable the context does not define is an error, reported
//! as a malformed template naming the fragment. Output is never escaped.
//!
//! # Merge Semantics
//!
//! | Base value | Override value | Result              |
//! |------------|----------------|---------------------|
//! | mapping    | mapping        | merged key by key   |
//! | any        | sequence       | override            |
//! | any        | scalar / null  | override            |
//! | mapping    | non-mapping    | override            |

pub mod composer;
pub mod document;
pub mod overrides;
pub mod renderer;
pub mod utils;

pub use composer::TemplateComposer;
pub use document::{ManifestDocument, ResourceKey, join_documents, parse_documents};
pub use overrides::{apply_overrides, merge_documents, override_files};
pub use renderer::{RenderError, TemplateRenderer};
pub use utils::merge_yaml;
