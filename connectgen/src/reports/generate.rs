//! Generate command report.

use std::path::Path;

use connectgen_buf::TemplateSource;
use connectgen_plugin::Generation;

use super::output::{Output, Report};

/// Report data from one generation cycle, with paths shown relative to the project.
#[derive(Debug)]
pub struct GenerateReport {
    pub template: String,
    /// `(instance_name, service_identifier, import_path)` per service
    pub services: Vec<(String, String, String)>,
    pub warnings: Vec<String>,
    pub clients: String,
}

impl GenerateReport {
    pub fn new(root: &Path, generation: Generation) -> Self {
        let relative = |path: &Path| {
            path.strip_prefix(root)
                .unwrap_or(path)
                .display()
                .to_string()
        };

        Self {
            template: match &generation.template {
                TemplateSource::File(path) => relative(path),
                TemplateSource::Default => "default template".to_string(),
            },
            services: generation
                .services
                .into_iter()
                .map(|s| (s.instance_name, s.service_identifier, s.import_path))
                .collect(),
            warnings: generation
                .skipped
                .iter()
                .map(|skipped| format!("{} {}", relative(&skipped.path), skipped.reason))
                .collect(),
            clients: relative(&generation.clients),
        }
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        out.key_value("Template", &self.template);
        out.newline();

        if self.services.is_empty() {
            out.preformatted("No services found.");
        } else {
            out.section(&format!("Services ({})", self.services.len()));
            for (instance, identifier, import_path) in &self.services {
                out.added_item(&format!("{} ({} from {})", instance, identifier, import_path));
            }
        }
        out.newline();

        out.key_value("Generated", &self.clients);
    }
}
