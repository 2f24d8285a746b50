//! Container build plan and its Dockerfile rendering

use crate::languages::{BuildTemplate, Language};
use serde::Serialize;
use std::fmt;

const FALLBACK_IMAGE: &str = "alpine:3.19";
const FALLBACK_PORT: u16 = 8080;

/// Build stage: image, dependency installation and compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildStage {
    pub base: String,
    /// Manifests copied ahead of the sources so installs cache separately
    pub manifests: Vec<String>,
    pub install: Vec<String>,
    pub commands: Vec<String>,
}

/// Separate runtime image receiving only the build artifacts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeStage {
    pub base: String,
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerPlan {
    pub language: Option<Language>,
    pub build: BuildStage,
    pub runtime: Option<RuntimeStage>,
    pub command: Vec<String>,
    pub port: u16,
}

impl ContainerPlan {
    /// Plan for `template`, keeping only the manifests present in the output
    /// tree. Installation steps are dropped when no manifest is present.
    pub fn from_template(
        language: Language,
        template: BuildTemplate,
        present: impl Fn(&str) -> bool,
        command: Vec<String>,
    ) -> Self {
        let manifests: Vec<String> = template
            .manifest_files
            .into_iter()
            .filter(|m| present(m.as_str()))
            .collect();
        let install = if manifests.is_empty() {
            Vec::new()
        } else {
            template.install_commands
        };

        Self {
            language: Some(language),
            build: BuildStage {
                base: template.build_image,
                manifests,
                install,
                commands: template.build_commands,
            },
            runtime: template.runtime_image.map(|base| RuntimeStage {
                base,
                artifacts: template.artifacts,
            }),
            command,
            port: template.port,
        }
    }

    /// Plan for a tree with no packaged language
    pub fn fallback(command: Vec<String>) -> Self {
        Self {
            language: None,
            build: BuildStage {
                base: FALLBACK_IMAGE.to_string(),
                ..BuildStage::default()
            },
            runtime: None,
            command,
            port: FALLBACK_PORT,
        }
    }
}

/// Exec-form instruction argument: a JSON array of strings
fn exec_form(args: &[String]) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| "[]".to_string())
}

impl fmt::Display for ContainerPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(language) = self.language {
            writeln!(f, "# {} application", language)?;
        }
        match &self.runtime {
            Some(_) => writeln!(f, "FROM {} AS build", self.build.base)?,
            None => writeln!(f, "FROM {}", self.build.base)?,
        }
        writeln!(f, "WORKDIR /app")?;

        if !self.build.manifests.is_empty() {
            writeln!(f, "COPY {} ./", self.build.manifests.join(" "))?;
            for cmd in &self.build.install {
                writeln!(f, "RUN {}", cmd)?;
            }
        }
        writeln!(f, "COPY . .")?;
        for cmd in &self.build.commands {
            writeln!(f, "RUN {}", cmd)?;
        }

        if let Some(runtime) = &self.runtime {
            writeln!(f)?;
            writeln!(f, "FROM {}", runtime.base)?;
            writeln!(f, "WORKDIR /app")?;
            for artifact in &runtime.artifacts {
                writeln!(f, "COPY --from=build {} {}", artifact, artifact)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "EXPOSE {}", self.port)?;
        if !self.command.is_empty() {
            writeln!(f, "CMD {}", exec_form(&self.command))?;
        }
        Ok(())
    }
}
