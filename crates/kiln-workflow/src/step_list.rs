use crate::step::Step;
use crate::variants::StepKind;
use kiln_error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Ordered steps for one run. Insertion order is execution order.
#[derive(Debug)]
pub struct StepList {
    root: PathBuf,
    steps: Vec<Step>,
    next_id: usize,
}

impl StepList {
    /// `root` is the working root that relative paths and delete guards use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            steps: Vec::new(),
            next_id: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the working root. Absolute paths pass through.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Append a step that halts the run on failure.
    pub fn add(&mut self, name: &str, kind: StepKind) -> ConfigResult<&mut Self> {
        self.push(Some(name), kind, true)
    }

    /// Append a step. Without a name one is generated (`BuildStep_00`, `BuildStep_01`, ...).
    pub fn push(
        &mut self,
        name: Option<&str>,
        kind: StepKind,
        stop_on_failure: bool,
    ) -> ConfigResult<&mut Self> {
        let name = match name {
            Some(name) => {
                if self.contains(name) {
                    return Err(ConfigError::DuplicateName(name.to_string()));
                }
                name.to_string()
            }
            None => self.next_name(),
        };
        self.steps.push(Step::new(name, kind, stop_on_failure));
        Ok(self)
    }

    fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("BuildStep_{:02}", self.next_id);
            self.next_id += 1;
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.steps.iter_mut()
    }

    /// Numbered plan lines, one per step.
    pub fn summary_lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(idx, step)| format!("{:02}. {}: {}", idx + 1, step.name(), step.kind()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepStatus;

    fn noop() -> StepKind {
        StepKind::Generic(Box::new(|| StepStatus::Ok))
    }

    #[test]
    fn generated_names_count_up_per_list() {
        let mut first = StepList::new(".");
        first.push(None, noop(), true).unwrap();
        first.push(None, noop(), true).unwrap();
        let mut second = StepList::new(".");
        second.push(None, noop(), true).unwrap();

        let names: Vec<&str> = first.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["BuildStep_00", "BuildStep_01"]);
        assert_eq!(second.iter().next().unwrap().name(), "BuildStep_00");
    }

    #[test]
    fn generated_names_skip_explicit_ones() {
        let mut list = StepList::new(".");
        list.add("BuildStep_00", noop()).unwrap();
        list.push(None, noop(), false).unwrap();
        assert!(list.contains("BuildStep_01"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut list = StepList::new(".");
        list.add("Copy revision file", noop()).unwrap();
        let err = list.add("Copy revision file", noop()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut list = StepList::new(".");
        list.add("c", noop()).unwrap().add("a", noop()).unwrap();
        list.add("b", noop()).unwrap();
        let names: Vec<&str> = list.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn resolve_joins_relative_paths_only() {
        let list = StepList::new("/work");
        assert_eq!(list.resolve("build"), PathBuf::from("/work/build"));
        assert_eq!(list.resolve("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn summary_lines_number_steps() {
        let mut list = StepList::new(".");
        list.add("Create revision file", noop()).unwrap();
        assert_eq!(
            list.summary_lines(),
            vec!["01. Create revision file: callback".to_string()]
        );
    }
}
