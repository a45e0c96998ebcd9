// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A clock abstraction so time-sensitive outputs are testable.
//!
//! Signed URLs embed an absolute expiration time. Clients accept a [Clock]
//! so tests can pin it.

use std::time::SystemTime;

/// A source of wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> SystemTime;
}

/// The default clock, backed by [SystemTime::now].
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug)]
    struct FixedClock(SystemTime);
    impl Clock for FixedClock {
        fn now(&self) -> SystemTime {
            self.0
        }
    }

    #[test]
    fn fixed_clock_is_stable() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let clock = FixedClock(t);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        assert!(clock.now() >= SystemTime::UNIX_EPOCH);
    }
}
