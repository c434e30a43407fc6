//! Run-keyed lazy cache slot
//!
//! A slot starts empty and is loaded on first use. It is rebuilt when a
//! query carries another run number (or, when requested, another
//! calibration directory) and never returns to the empty state. The old
//! resource is dropped before the builder runs.

use log::warn;

use crate::detector::constants::RUN_UNDEFINED;

/// Observable state of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Loaded { run: i32 },
}

/// Cache of one resource keyed by run number
///
/// The slot exclusively owns its resource; callers borrow it for the
/// duration of a query.
#[derive(Debug)]
pub struct RunSlot<T> {
    name: &'static str,
    run: i32,
    calib_dir: String,
    resource: Option<T>,
    builds: u64,
    warned_dir: Option<String>,
}

impl<T> RunSlot<T> {
    /// Create an empty slot
    ///
    /// # Arguments
    /// * `name` - Resource name used in log messages
    pub fn new(name: &'static str) -> Self {
        RunSlot {
            name,
            run: RUN_UNDEFINED,
            calib_dir: String::new(),
            resource: None,
            builds: 0,
            warned_dir: None,
        }
    }

    /// Current state: `Empty` before the first build, `Loaded` afterwards
    pub fn state(&self) -> SlotState {
        match self.resource {
            Some(_) => SlotState::Loaded { run: self.run },
            None => SlotState::Empty,
        }
    }

    /// Run the resource was built for, `-1` before the first load
    pub fn run(&self) -> i32 {
        self.run
    }

    /// Calibration directory the resource was built from
    pub fn calib_dir(&self) -> &str {
        &self.calib_dir
    }

    /// Number of builds so far
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Cached resource without triggering a build
    pub fn get(&self) -> Option<&T> {
        self.resource.as_ref()
    }

    /// Check whether a query would rebuild the resource
    ///
    /// # Arguments
    /// * `run` - Run number of the query
    /// * `calib_dir` - Calibration directory of the query
    /// * `dir_in_key` - Whether a directory change alone forces a rebuild
    ///
    /// # Returns
    /// `true` when the slot is empty or keyed differently
    pub fn needs_rebuild(&self, run: i32, calib_dir: &str, dir_in_key: bool) -> bool {
        self.resource.is_none() || run != self.run || (dir_in_key && calib_dir != self.calib_dir)
    }

    /// Resource for `run`, rebuilt with `build` when the key changed
    ///
    /// The previous resource is dropped before `build` runs. With
    /// `dir_in_key` off, a directory change within the same run keeps the
    /// cached resource and logs one warning per new directory.
    ///
    /// # Arguments
    /// * `run` - Run number of the query
    /// * `calib_dir` - Calibration directory of the query
    /// * `dir_in_key` - Whether the directory is part of the cache key
    /// * `build` - Constructor of the resource, called at most once
    ///
    /// # Returns
    /// A reference to the cached or freshly built resource
    pub fn get_or_rebuild<F>(&mut self, run: i32, calib_dir: &str, dir_in_key: bool, build: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if self.needs_rebuild(run, calib_dir, dir_in_key) {
            self.resource = None;
            self.run = run;
            self.calib_dir = calib_dir.to_string();
            self.warned_dir = None;
            self.builds += 1;
        } else if calib_dir != self.calib_dir && self.warned_dir.as_deref() != Some(calib_dir) {
            warn!("{}: calibration directory changed to {} within run {}; keeping resource built from {}",
                  self.name, calib_dir, run, self.calib_dir);
            self.warned_dir = Some(calib_dir.to_string());
        }
        self.resource.get_or_insert_with(build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Resource that records when it is dropped
    struct Tracked {
        run: i32,
        alive: Rc<Cell<i32>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.alive.set(self.alive.get() - 1);
        }
    }

    fn build(run: i32, alive: &Rc<Cell<i32>>) -> Tracked {
        // previous instance must already be gone
        assert_eq!(alive.get(), 0);
        alive.set(alive.get() + 1);
        Tracked { run, alive: alive.clone() }
    }

    #[test]
    fn loads_once_per_run() {
        let alive = Rc::new(Cell::new(0));
        let mut slot = RunSlot::new("test");
        assert_eq!(slot.state(), SlotState::Empty);
        assert_eq!(slot.run(), -1);

        assert_eq!(slot.get_or_rebuild(5, "", false, || build(5, &alive)).run, 5);
        assert_eq!(slot.get_or_rebuild(5, "", false, || build(5, &alive)).run, 5);
        assert_eq!(slot.builds(), 1);

        for run in [6, 7, 5] {
            assert_eq!(slot.get_or_rebuild(run, "", false, || build(run, &alive)).run, run);
            assert_eq!(alive.get(), 1);
        }
        assert_eq!(slot.builds(), 4);
        assert_eq!(slot.state(), SlotState::Loaded { run: 5 });
    }

    #[test]
    fn directory_is_part_of_the_key_only_on_request() {
        let alive = Rc::new(Cell::new(0));
        let mut slot = RunSlot::new("test");
        slot.get_or_rebuild(1, "/a", false, || build(1, &alive));
        slot.get_or_rebuild(1, "/b", false, || build(1, &alive));
        assert_eq!(slot.builds(), 1);
        assert_eq!(slot.calib_dir(), "/a");

        slot.get_or_rebuild(1, "/b", true, || build(1, &alive));
        assert_eq!(slot.builds(), 2);
        assert_eq!(slot.calib_dir(), "/b");
    }
}
