//! The aggregation barrier.
//!
//! Every module of a build registers its dependencies with one shared
//! [`AlignmentBarrier`]. Registrations may arrive from any number of threads, in any
//! order. The barrier stores each module's data under a single mutex, and the registration
//! that removes the last module from the remaining set performs the whole alignment itself:
//!
//! 1. build one combined [`Request`] from every module
//! 2. run the [`Orchestrator`] (customizers and the single authority call)
//! 3. stage every module's version and aligned dependencies on a copy of the model
//! 4. publish the staged model in one step
//!
//! No registration waits for another: all but the last return
//! [`RegistrationStatus::Pending`] as soon as their data is stored. The last one returns
//! [`RegistrationStatus::Complete`]. Read the model only after some registration returned
//! `Complete`, through [`AlignmentBarrier::finished_model`].
//!
//! When alignment fails nothing is published, and every later registration reports the same
//! failure.
//!
//! A model from an earlier run can seed the barrier through
//! [`AlignmentBarrier::with_previous_model`]: dependencies that run already aligned are sent
//! to the authority at their aligned version instead of the declared one.
//!
//! # Example
//!
//! ```rust
//! use depalign_cli::alignment::{
//!     DependencySource, Orchestrator, ProjectVersionSettings, ResponseCustomizer,
//! };
//! use depalign_cli::barrier::{AlignmentBarrier, BarrierPolicy, Registration};
//! use depalign_cli::coordinate::Coordinate;
//! use depalign_cli::model::AlignmentModel;
//!
//! let model = AlignmentModel::new("root", "org.acme");
//! let orchestrator = Orchestrator::new(None, DependencySource::None)?.with_response_customizer(
//!     ResponseCustomizer::ProjectVersion(ProjectVersionSettings::default()),
//! );
//! let barrier = AlignmentBarrier::new(model, orchestrator, BarrierPolicy::default())?;
//!
//! let status = barrier.register(Registration::new(
//!     ":",
//!     Coordinate::new("org.acme", "root", "1.0"),
//!     vec![],
//! ))?;
//! assert!(status.is_complete());
//! assert_eq!(barrier.finished_model()?.root().version(), Some("1.0-redhat-00001"));
//! # Ok::<(), depalign_cli::core::AlignError>(())
//! ```

use crate::alignment::{AlignmentOutcome, ModuleRequest, Orchestrator, Request, Response};
use crate::coordinate::{Coordinate, DeclaredDependency, ProjectRef};
use crate::core::AlignError;
use crate::model::AlignmentModel;
use crate::version;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

/// One module's contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Root-relative path or unique name of the module
    pub module: String,
    /// The module's own `group:name:version`; blank group or unspecified version mean the
    /// module contributes no project coordinate
    pub coordinate: Coordinate,
    pub dependencies: Vec<DeclaredDependency>,
}

impl Registration {
    pub fn new(
        module: impl Into<String>,
        coordinate: Coordinate,
        dependencies: Vec<DeclaredDependency>,
    ) -> Self {
        Self {
            module: module.into(),
            coordinate,
            dependencies,
        }
    }

    fn is_fully_defined(&self) -> bool {
        !self.coordinate.group.trim().is_empty()
            && !version::is_unspecified(&self.coordinate.version)
    }
}

/// Policies the barrier applies while registering and writing the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrierPolicy {
    /// Drop unresolvable dependencies with a warning instead of failing
    pub ignore_unresolvable_dependencies: bool,
    /// Assign new versions to modules; when false they keep their declared version
    pub version_modification: bool,
    /// Keep `-SNAPSHOT` on project coordinates sent to the authority
    pub preserve_snapshot: bool,
    /// Module path or name → version replacing the computed project version
    pub module_versions: BTreeMap<String, String>,
}

impl Default for BarrierPolicy {
    fn default() -> Self {
        Self {
            ignore_unresolvable_dependencies: false,
            version_modification: true,
            preserve_snapshot: false,
            module_versions: BTreeMap::new(),
        }
    }
}

/// What the completing registration hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentHandle {
    /// The project version after customization
    pub new_project_version: String,
    /// True when the dependency source policy skipped the authority
    pub skipped_by_policy: bool,
    /// Module path → dependencies nothing aligned
    pub non_aligned: BTreeMap<String, Vec<Coordinate>>,
}

/// Result of one [`AlignmentBarrier::register`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Data stored; other modules still have to register
    Pending { remaining: usize },
    /// This call was the last one and performed the alignment
    Complete(AlignmentHandle),
}

impl RegistrationStatus {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    #[must_use]
    pub fn into_handle(self) -> Option<AlignmentHandle> {
        match self {
            Self::Complete(handle) => Some(handle),
            Self::Pending { .. } => None,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Collecting,
    Aligning,
    Completed(AlignmentHandle),
    Failed(AlignError),
}

#[derive(Debug)]
struct BarrierState {
    /// Every module path, root first
    order: Vec<String>,
    remaining: HashSet<String>,
    registered: HashMap<String, Registration>,
    phase: Phase,
}

/// Shared state of one build's alignment. Create one per build and share it by `Arc`.
#[derive(Debug)]
pub struct AlignmentBarrier {
    orchestrator: Orchestrator,
    policy: BarrierPolicy,
    state: Mutex<BarrierState>,
    model: RwLock<AlignmentModel>,
    /// Module path → aligned dependencies of an earlier run
    previous: HashMap<String, BTreeMap<String, Coordinate>>,
}

impl AlignmentBarrier {
    /// Create a barrier expecting one registration per node of `model`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ModuleNotFound`] or [`AlignError::AmbiguousModule`] when a
    /// `module_versions` key does not name exactly one module.
    pub fn new(
        model: AlignmentModel,
        orchestrator: Orchestrator,
        mut policy: BarrierPolicy,
    ) -> Result<Self, AlignError> {
        let mut module_versions = BTreeMap::new();
        for (key, version) in &policy.module_versions {
            module_versions.insert(model.resolve(key)?, version.clone());
        }
        policy.module_versions = module_versions;

        let order = model.paths();
        debug!("Alignment barrier expects {} modules", order.len());

        Ok(Self {
            orchestrator,
            policy,
            state: Mutex::new(BarrierState {
                remaining: order.iter().cloned().collect(),
                order,
                registered: HashMap::new(),
                phase: Phase::Collecting,
            }),
            model: RwLock::new(model),
            previous: HashMap::new(),
        })
    }

    /// Seed dependency resolution with the aligned dependencies of an earlier run.
    ///
    /// Modules of `previous` that this build does not have are ignored.
    #[must_use]
    pub fn with_previous_model(mut self, previous: &AlignmentModel) -> Self {
        self.previous = previous
            .paths()
            .into_iter()
            .filter_map(|path| {
                let module = previous.find(&path).ok()?;
                (!module.aligned_dependencies().is_empty())
                    .then(|| (path, module.aligned_dependencies().clone()))
            })
            .collect();
        debug!("Seeded alignment with earlier results for {} modules", self.previous.len());
        self
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, BarrierState>, AlignError> {
        self.state.lock().map_err(|_| AlignError::BarrierPoisoned)
    }

    /// Number of modules that have not registered yet.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::BarrierPoisoned`] when the state lock is poisoned.
    pub fn remaining(&self) -> Result<usize, AlignError> {
        Ok(self.lock_state()?.remaining.len())
    }

    /// Whether alignment completed successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lock_state()
            .map(|state| matches!(state.phase, Phase::Completed(_)))
            .unwrap_or(false)
    }

    /// Register one module's dependencies.
    ///
    /// # Errors
    ///
    /// - [`AlignError::UnresolvableDependency`] when a dependency has no resolved coordinate
    ///   and the policy does not ignore it; the whole alignment is aborted
    /// - [`AlignError::ModuleNotFound`] for a module the model does not know
    /// - [`AlignError::DuplicateRegistration`] for a second registration of one module
    /// - [`AlignError::BarrierCompleted`] after alignment completed
    /// - any alignment failure, for the completing call and every call after it
    pub fn register(&self, registration: Registration) -> Result<RegistrationStatus, AlignError> {
        let path = self.read_model()?.resolve(&registration.module)?;
        info!(
            "Registering module {} ({}) with {} dependencies",
            path,
            registration.coordinate,
            registration.dependencies.len()
        );

        let modules = {
            let mut state = self.lock_state()?;
            match &state.phase {
                Phase::Collecting => {}
                Phase::Failed(e) => return Err(e.clone()),
                Phase::Aligning | Phase::Completed(_) => return Err(AlignError::BarrierCompleted),
            }

            if state.registered.contains_key(&path) {
                return Err(AlignError::DuplicateRegistration {
                    module: path,
                });
            }

            let registration = match self.sanitize(registration, &path) {
                Ok(registration) => registration,
                Err(e) => {
                    state.phase = Phase::Failed(e.clone());
                    return Err(e);
                }
            };
            state.remaining.remove(&path);
            state.registered.insert(path.clone(), registration);

            if !state.remaining.is_empty() {
                debug!("Still have {} modules to scan", state.remaining.len());
                return Ok(RegistrationStatus::Pending {
                    remaining: state.remaining.len(),
                });
            }

            state.phase = Phase::Aligning;
            let mut registered = std::mem::take(&mut state.registered);
            state
                .order
                .iter()
                .filter_map(|p| registered.remove(p).map(|r| (p.clone(), r)))
                .collect::<Vec<_>>()
        };

        info!(
            "Completed scanning {} modules; now processing exclusions, authority and overrides",
            modules.len()
        );

        let result = self.align_and_publish(modules);

        let mut state = self.lock_state()?;
        match result {
            Ok(handle) => {
                state.phase = Phase::Completed(handle.clone());
                Ok(RegistrationStatus::Complete(handle))
            }
            Err(e) => {
                state.phase = Phase::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// A copy of the finished model.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::AlignmentPending`] before completion, or the alignment failure.
    pub fn finished_model(&self) -> Result<AlignmentModel, AlignError> {
        {
            let state = self.lock_state()?;
            match &state.phase {
                Phase::Completed(_) => {}
                Phase::Failed(e) => return Err(e.clone()),
                Phase::Collecting | Phase::Aligning => {
                    return Err(AlignError::AlignmentPending {
                        remaining: state.remaining.len(),
                    });
                }
            }
        }
        Ok(self.read_model()?.clone())
    }

    /// The handle of a completed alignment.
    ///
    /// # Errors
    ///
    /// Same as [`AlignmentBarrier::finished_model`].
    pub fn handle(&self) -> Result<AlignmentHandle, AlignError> {
        let state = self.lock_state()?;
        match &state.phase {
            Phase::Completed(handle) => Ok(handle.clone()),
            Phase::Failed(e) => Err(e.clone()),
            Phase::Collecting | Phase::Aligning => Err(AlignError::AlignmentPending {
                remaining: state.remaining.len(),
            }),
        }
    }

    fn read_model(&self) -> Result<std::sync::RwLockReadGuard<'_, AlignmentModel>, AlignError> {
        self.model.read().map_err(|_| AlignError::BarrierPoisoned)
    }

    /// Drop group-less dependencies and apply the unresolvable-dependency policy.
    fn sanitize(&self, mut registration: Registration, path: &str) -> Result<Registration, AlignError> {
        let mut kept = Vec::with_capacity(registration.dependencies.len());
        for dependency in registration.dependencies {
            if dependency.declared.group.trim().is_empty() {
                warn!(
                    "Module {} has dependency {} with an empty group, ignoring it",
                    path, dependency.declared
                );
                continue;
            }
            if dependency.resolved.is_none() {
                if self.policy.ignore_unresolvable_dependencies {
                    warn!(
                        "Module {}: ignoring unresolvable dependency {}",
                        path, dependency.declared
                    );
                    continue;
                }
                return Err(AlignError::UnresolvableDependency {
                    module: path.to_string(),
                    dependency: dependency.declared.to_string(),
                });
            }
            kept.push(self.seed_from_previous(dependency, path));
        }
        registration.dependencies = kept;
        Ok(registration)
    }

    /// Swap the resolved coordinate for the one an earlier run aligned it to.
    fn seed_from_previous(&self, mut dependency: DeclaredDependency, path: &str) -> DeclaredDependency {
        let earlier = self
            .previous
            .get(path)
            .and_then(|aligned| aligned.get(&dependency.declared.to_string()));
        let replacement = match (earlier, &dependency.resolved) {
            (Some(earlier), Some(resolved)) if earlier.version != resolved.version => {
                info!("Using existing model to update {} to {}", resolved, earlier);
                Some(earlier.clone())
            }
            _ => None,
        };
        if replacement.is_some() {
            dependency.resolved = replacement;
        }
        dependency
    }

    /// Resolved coordinates that came from the earlier run's model.
    fn seeded_coordinates(&self, modules: &[(String, Registration)]) -> HashSet<Coordinate> {
        modules
            .iter()
            .filter_map(|(path, registration)| {
                self.previous.get(path).map(|aligned| (aligned, registration))
            })
            .flat_map(|(aligned, registration)| {
                registration.dependencies.iter().filter_map(move |dependency| {
                    let resolved = dependency.resolved.as_ref()?;
                    (aligned.get(&dependency.declared.to_string()) == Some(resolved))
                        .then(|| resolved.clone())
                })
            })
            .collect()
    }

    fn build_request(&self, modules: &[(String, Registration)]) -> Result<Request, AlignError> {
        let internal: HashSet<ProjectRef> =
            modules.iter().map(|(_, r)| r.coordinate.project_ref()).collect();

        let mut project_coordinates = Vec::new();
        for (path, registration) in modules {
            if registration.is_fully_defined() {
                let coordinate = &registration.coordinate;
                let version = if self.policy.preserve_snapshot {
                    coordinate.version.as_str()
                } else {
                    version::strip_snapshot(&coordinate.version)
                };
                debug!("Adding {} to the request for scanning", coordinate);
                project_coordinates.push(coordinate.with_version(version));
            } else {
                warn!(
                    "Module {} ({}) is not fully defined; it contributes no project coordinate",
                    path, registration.coordinate
                );
            }
        }

        let project_version = modules
            .iter()
            .map(|(_, r)| r.coordinate.version.as_str())
            .find(|v| !version::is_unspecified(v))
            .ok_or_else(|| AlignError::ConfigError {
                message: "Unable to locate a suitable original version, every module is unversioned"
                    .to_string(),
            })?;

        let module_requests = modules
            .iter()
            .map(|(path, registration)| {
                let dependencies = registration
                    .dependencies
                    .iter()
                    .filter(|d| {
                        let is_internal = internal.contains(&d.declared.project_ref());
                        if is_internal {
                            debug!("Module {}: skipping inter-module dependency {}", path, d.declared);
                        }
                        !is_internal
                    })
                    .cloned()
                    .collect();
                ModuleRequest::new(path.clone(), registration.coordinate.clone(), dependencies)
            })
            .collect();

        Ok(Request::new(project_coordinates, project_version, module_requests))
    }

    fn align_and_publish(&self, modules: Vec<(String, Registration)>) -> Result<AlignmentHandle, AlignError> {
        let request = self.build_request(&modules)?;
        info!(
            "Combined request holds {} dependency entries from {} modules",
            request.dependency_count(),
            request.modules.len()
        );

        let outcome = self.orchestrator.align(request);
        let skipped_by_policy = outcome.is_skipped();
        let mut alignment = match outcome {
            AlignmentOutcome::Failed(e) => return Err(e),
            AlignmentOutcome::Aligned(alignment) | AlignmentOutcome::SkippedByPolicy(alignment) => {
                alignment
            }
        };
        if !skipped_by_policy {
            // earlier alignments stand when the authority has nothing newer
            let seeded = self.seeded_coordinates(&modules);
            alignment.response = alignment.response.with_pinned(seeded);
        }

        let new_project_version = alignment
            .response
            .new_project_version()
            .unwrap_or(&alignment.request.project_version)
            .to_string();

        let mut staged = self.read_model()?.clone();
        let non_aligned = self.stage(
            &mut staged,
            &modules,
            &alignment.request,
            &alignment.response,
            &new_project_version,
        )?;

        let mut model = self.model.write().map_err(|_| AlignError::BarrierPoisoned)?;
        *model = staged;
        info!("Alignment complete, project version is {}", new_project_version);

        Ok(AlignmentHandle {
            new_project_version,
            skipped_by_policy,
            non_aligned,
        })
    }

    /// Write every module's results into `model`. Nothing here touches the shared model.
    fn stage(
        &self,
        model: &mut AlignmentModel,
        modules: &[(String, Registration)],
        request: &Request,
        response: &Response,
        new_project_version: &str,
    ) -> Result<BTreeMap<String, Vec<Coordinate>>, AlignError> {
        model.root_mut().original_version = Some(request.project_version.clone());

        if model.root().group.trim().is_empty() {
            let groups: Vec<&str> = model
                .root()
                .children()
                .values()
                .map(|child| child.group.as_str())
                .filter(|group| !group.trim().is_empty())
                .collect();
            let prefix = common_group_prefix(&groups);
            if prefix.is_empty() {
                return Err(AlignError::ConfigError {
                    message: "Empty root group and no common group prefix among its modules"
                        .to_string(),
                });
            }
            warn!("Root group is empty, defaulting to common prefix '{}'", prefix);
            model.root_mut().group = prefix;
        }

        let declared_versions: HashMap<&str, &str> = modules
            .iter()
            .map(|(path, r)| (path.as_str(), r.coordinate.version.as_str()))
            .collect();

        let mut non_aligned = BTreeMap::new();
        for module_request in &request.modules {
            let path = module_request.id.as_str();
            let node = model.find_mut(path)?;
            let declared = declared_versions.get(path).copied().unwrap_or_default();

            if !version::is_unspecified(declared) {
                node.original_version = Some(declared.to_string());
            }

            if self.policy.version_modification {
                let version = self
                    .policy
                    .module_versions
                    .get(path)
                    .map_or(new_project_version, String::as_str);
                info!("Updating module {} from version {} to {}", path, declared, version);
                node.assign_version(version, path)?;
            } else if !version::is_unspecified(declared) {
                node.assign_version(declared, path)?;
            }

            let mut missing = Vec::new();
            for dependency in &module_request.dependencies {
                let Some(resolved) = &dependency.resolved else {
                    continue;
                };
                if dependency.is_dynamic() {
                    node.insert_aligned(&dependency.declared, resolved.clone());
                }
                match response.aligned_version(resolved, &module_request.owner) {
                    Some(aligned) => {
                        debug!(
                            "In module {} with coordinate {} found a replacement version of {}",
                            path, resolved, aligned
                        );
                        node.insert_aligned(&dependency.declared, resolved.with_version(aligned));
                    }
                    None => missing.push(resolved.clone()),
                }
            }
            if !missing.is_empty() {
                non_aligned.insert(path.to_string(), missing);
            }
        }

        Ok(non_aligned)
    }
}

/// Longest dotted prefix shared by every group.
fn common_group_prefix(groups: &[&str]) -> String {
    let mut iter = groups.iter().map(|group| group.split('.').collect::<Vec<_>>());
    let Some(mut prefix) = iter.next() else {
        return String::new();
    };
    for segments in iter {
        let shared = prefix.iter().zip(&segments).take_while(|(a, b)| a == b).count();
        prefix.truncate(shared);
    }
    prefix.join(".")
}
