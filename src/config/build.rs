//! Build descriptions.
//!
//! A build description lists the modules of one build and what each of them depends on.
//! It stands in for the dependency graph a build tool would report:
//!
//! ```toml
//! [root]
//! name = "root"
//! group = "org.acme"
//! version = "1.0"
//! dependencies = ["org.hibernate:hibernate-core:5.3.7.Final"]
//!
//! [[modules]]
//! path = ":sub"
//! dependencies = [
//!     "org.slf4j:slf4j-api:1.7.25",
//!     { declared = "com.google.guava:guava:19.+", resolved = "com.google.guava:guava:19.0" },
//! ]
//! ```
//!
//! A module's `name` defaults to the last segment of its path, and its `group` and `version`
//! default to the root's.

use crate::barrier::Registration;
use crate::coordinate::{Coordinate, DeclaredDependency};
use crate::core::AlignError;
use crate::model::{AlignmentModel, Module, ROOT_PATH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One dependency, either an exact coordinate string or a declared/resolved pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyDescription {
    Simple(String),
    Detailed {
        declared: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolved: Option<String>,
    },
}

impl DependencyDescription {
    /// The dependency as the barrier expects it.
    ///
    /// An exact declaration without `resolved` resolves to itself. A dynamic one stays
    /// unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ConfigError`] when a coordinate does not parse.
    pub fn to_declared(&self) -> Result<DeclaredDependency, AlignError> {
        match self {
            Self::Simple(declared) => Ok(exact_or_unresolved(declared.parse()?)),
            Self::Detailed {
                declared,
                resolved: None,
            } => Ok(exact_or_unresolved(declared.parse()?)),
            Self::Detailed {
                declared,
                resolved: Some(resolved),
            } => Ok(DeclaredDependency::new(declared.parse()?, Some(resolved.parse()?))),
        }
    }
}

fn exact_or_unresolved(declared: Coordinate) -> DeclaredDependency {
    let dependency = DeclaredDependency::from(declared);
    if dependency.is_dynamic() {
        DeclaredDependency::new(dependency.declared, None)
    } else {
        dependency
    }
}

/// One module of the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescription {
    /// `:` for the root, `:a:b` for nested modules
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDescription>,
}

/// All modules of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildDescription {
    pub root: ModuleDescription,
    #[serde(default)]
    pub modules: Vec<ModuleDescription>,
}

impl BuildDescription {
    /// Load a build description file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        super::parse_config(path)
            .with_context(|| format!("Cannot load build description: {}", path.display()))
    }

    fn root_name(&self) -> String {
        self.root.name.clone().unwrap_or_else(|| "root".to_string())
    }

    fn root_group(&self) -> String {
        self.root.group.clone().unwrap_or_default()
    }

    fn name_of(module: &ModuleDescription) -> String {
        module.name.clone().unwrap_or_else(|| {
            module.path.rsplit(':').next().unwrap_or_default().to_string()
        })
    }

    fn group_of(&self, module: &ModuleDescription) -> String {
        module.group.clone().unwrap_or_else(|| self.root_group())
    }

    fn version_of(&self, module: &ModuleDescription) -> String {
        module
            .version
            .clone()
            .or_else(|| self.root.version.clone())
            .unwrap_or_default()
    }

    /// Build the model tree, parents before children.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidModelPath`] for a path that is not nested under an
    /// existing module, or a duplicate path.
    pub fn to_model(&self) -> Result<AlignmentModel, AlignError> {
        let mut model = AlignmentModel::new(self.root_name(), self.root_group());

        let mut modules: Vec<&ModuleDescription> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.path.matches(':').count());

        for module in modules {
            model.add_module(
                &module.path,
                Module::new(Self::name_of(module), self.group_of(module)),
            )?;
        }
        Ok(model)
    }

    /// One registration per module, root first.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ConfigError`] when a dependency coordinate does not parse.
    pub fn registrations(&self) -> Result<Vec<Registration>, AlignError> {
        let root = Registration::new(
            ROOT_PATH,
            Coordinate::new(self.root_group(), self.root_name(), self.version_of(&self.root)),
            dependencies_of(&self.root)?,
        );

        let mut registrations = vec![root];
        for module in &self.modules {
            registrations.push(Registration::new(
                module.path.clone(),
                Coordinate::new(self.group_of(module), Self::name_of(module), self.version_of(module)),
                dependencies_of(module)?,
            ));
        }
        Ok(registrations)
    }
}

fn dependencies_of(module: &ModuleDescription) -> Result<Vec<DeclaredDependency>, AlignError> {
    module.dependencies.iter().map(DependencyDescription::to_declared).collect()
}
