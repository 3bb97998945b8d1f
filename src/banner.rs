//! Metadata banner rendered from the manifest and prepended to built files.

use crate::build::artifact::Artifact;
use crate::manifest::{ManifestRecord, UNKNOWN};

/// Render the banner comment for `record`.
///
/// The copyright year is the UTC year of the last stamped build. The banner
/// ends with a newline so the artifact content starts on its own line.
///
/// ```text
/// /**
///  * Copyright (c) 2026 A
///  * my-app - Single page app
///  * @version v1.2.10
///  * @build Fri, 16 Oct 2026 09:05:03 GMT
///  * @link https://example.com/my-app
///  * @license MIT
///  */
/// ```
pub fn render_banner(record: &ManifestRecord) -> String {
    let field = |value: Option<&str>| value.unwrap_or(UNKNOWN).to_string();

    let lines = [
        "/**".to_string(),
        format!(" * Copyright (c) {} {}", record.build_year(), field(record.author())),
        format!(" * {} - {}", field(record.name()), field(record.description())),
        format!(" * @version v{}", field(record.version_text())),
        format!(" * @build {}", field(record.last_build_date_utc())),
        format!(" * @link {}", field(record.repository())),
        format!(" * @license {}", field(record.license())),
        " */".to_string(),
        String::new(),
    ];
    lines.join("\n")
}

/// Return `banner` followed by `content`.
pub fn prepend_text(banner: &str, content: &str) -> String {
    let mut out = String::with_capacity(banner.len() + content.len());
    out.push_str(banner);
    out.push_str(content);
    out
}

/// Return a new artifact whose content is `banner` followed by the original.
pub fn prepend(artifact: &Artifact, banner: &str) -> Artifact {
    artifact.with_content(prepend_text(banner, artifact.content()))
}
