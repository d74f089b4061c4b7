//! Rise/set pass search.
//!
//! The search sweeps topocentric elevation forward in coarse steps and relocalizes
//! each horizon crossing backward in fine steps. Control flow is an explicit state
//! machine over a pluggable elevation sampler, so the coarse/fine policy — including
//! false-rise suppression and the circumpolar bookkeeping — is testable with
//! synthetic profiles, independent of the propagator.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{Days, Degree};
use crate::elements::Satellite;
use crate::flyover_errors::FlyoverError;
use crate::instant::Instant;
use crate::observer::ObserverFrame;
use crate::propagation::propagate;

/// One elevation/azimuth sample of a sky track.
#[derive(Debug, Clone, Copy)]
pub struct HorizonSample {
    pub elevation: Degree,
    pub azimuth: Degree,
}

/// A horizon crossing: when, and where on the compass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HorizonCrossing {
    pub time: Instant,
    pub azimuth: Degree,
}

/// Outcome of one pass search.
///
/// `found()` is true only when both a rise and a set were located inside the
/// search horizon. A search that finds neither is still meaningful: the
/// `ever_up`/`ever_down` flags separate "never visible" from "always visible"
/// from a genuine horizon-exhausted failure.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PassEvent {
    rise: Option<HorizonCrossing>,
    set: Option<HorizonCrossing>,
    ever_up: bool,
    ever_down: bool,
}

impl PassEvent {
    /// Both rise and set located.
    pub fn found(&self) -> bool {
        self.rise.is_some() && self.set.is_some()
    }

    pub fn rise_time(&self) -> Option<Instant> {
        self.rise.map(|c| c.time)
    }

    pub fn rise_azimuth(&self) -> Option<Degree> {
        self.rise.map(|c| c.azimuth)
    }

    pub fn set_time(&self) -> Option<Instant> {
        self.set.map(|c| c.time)
    }

    pub fn set_azimuth(&self) -> Option<Degree> {
        self.set.map(|c| c.azimuth)
    }

    /// Did any sample reach the minimum elevation?
    pub fn is_ever_up(&self) -> bool {
        self.ever_up
    }

    /// Did any sample stay below the minimum elevation?
    pub fn is_ever_down(&self) -> bool {
        self.ever_down
    }
}

/// Tuning knobs of the coarse-to-fine sweep.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Elevation threshold counting as "up", degrees.
    pub min_elevation: Degree,
    /// Forward sweep step, seconds.
    pub coarse_step: f64,
    /// Backward relocalization step, seconds.
    pub fine_step: f64,
    /// Search horizon, days.
    pub horizon: Days,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            min_elevation: 1.0,
            coarse_step: 90.0,
            fine_step: 2.0,
            horizon: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchPhase {
    /// Forward coarse sweep, watching for threshold transitions.
    Searching,
    /// Backward fine sweep pinning down a below→above transition.
    RefiningRise,
    /// Backward fine sweep pinning down an above→below transition.
    RefiningSet,
    Done,
}

/// Locate the next rise and set of a satellite over an observer, searching
/// forward from `now`.
pub struct PassPredictor<'a> {
    satellite: &'a Satellite,
    observer: &'a ObserverFrame,
    params: SearchParams,
}

impl<'a> PassPredictor<'a> {
    pub fn new(satellite: &'a Satellite, observer: &'a ObserverFrame) -> Self {
        PassPredictor {
            satellite,
            observer,
            params: SearchParams::default(),
        }
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Run the search. "No pass found" is a normal outcome, not an error; only a
    /// degenerate propagation aborts the sweep.
    pub fn next_pass(&self, now: Instant) -> Result<PassEvent, FlyoverError> {
        if !self.satellite.elements.is_fresh(now) {
            warn!(
                "element set for {} is {:.1} days past epoch, predictions degrade",
                self.satellite.name,
                (now - self.satellite.elements.epoch).abs()
            );
        }
        let mut sampler = |t: Instant| -> Result<HorizonSample, FlyoverError> {
            let view = propagate(&self.satellite.elements, t)?.topo(self.observer);
            Ok(HorizonSample {
                elevation: view.elevation,
                azimuth: view.azimuth,
            })
        };
        search(&mut sampler, now, &self.params)
    }
}

/// The coarse-to-fine sweep over an arbitrary elevation sampler.
pub(crate) fn search<F>(
    sampler: &mut F,
    now: Instant,
    params: &SearchParams,
) -> Result<PassEvent, FlyoverError>
where
    F: FnMut(Instant) -> Result<HorizonSample, FlyoverError>,
{
    let min = params.min_elevation;
    let deadline = now.plus_days(params.horizon);
    // a refinement can only walk back across one coarse interval
    let max_refine = (params.coarse_step / params.fine_step).ceil() as usize + 1;

    let mut event = PassEvent::default();
    let mut phase = SearchPhase::Searching;
    let mut step = params.coarse_step;
    let mut refine_count = 0usize;

    // start one fine step early so the current instant itself gets evaluated
    let mut t = now.plus_seconds(-params.fine_step);
    let mut sample = sampler(t)?;
    note(&mut event, &sample, min);

    while phase != SearchPhase::Done {
        let t_next = t.plus_seconds(step);
        if phase == SearchPhase::Searching && t_next > deadline {
            break;
        }
        let next = sampler(t_next)?;
        note(&mut event, &next, min);

        match phase {
            SearchPhase::Searching => {
                let was_up = sample.elevation >= min;
                let is_up = next.elevation >= min;
                if was_up && !is_up && event.set.is_none() {
                    debug!("coarse set candidate near {:.6}", t_next.as_mjd());
                    phase = SearchPhase::RefiningSet;
                    step = -params.fine_step;
                    refine_count = 0;
                } else if !was_up && is_up && event.rise.is_none() {
                    debug!("coarse rise candidate near {:.6}", t_next.as_mjd());
                    phase = SearchPhase::RefiningRise;
                    step = -params.fine_step;
                    refine_count = 0;
                }
                t = t_next;
                sample = next;
            }

            SearchPhase::RefiningSet => {
                // walking backward from a below-threshold coarse sample; the first
                // above-threshold fine sample is the set
                refine_count += 1;
                if next.elevation >= min {
                    event.set = Some(HorizonCrossing {
                        time: t_next,
                        azimuth: next.azimuth,
                    });
                    phase = SearchPhase::Searching;
                    step = params.coarse_step;
                } else if refine_count >= max_refine {
                    // threshold not recrossed inside the coarse interval; abandon
                    phase = SearchPhase::Searching;
                    step = params.coarse_step;
                }
                t = t_next;
                sample = next;
            }

            SearchPhase::RefiningRise => {
                // walking backward from an above-threshold coarse sample; once the
                // profile drops below the threshold, `sample` (one fine step later)
                // is the rise candidate
                refine_count += 1;
                if next.elevation < min {
                    let candidate = HorizonCrossing {
                        time: t,
                        azimuth: sample.azimuth,
                    };
                    // peek one coarse step past the candidate: a profile already
                    // below the threshold again was a transient blip, and accepting
                    // it would also jump the sweep past the set that follows
                    let peek_t = candidate.time.plus_seconds(params.coarse_step);
                    let peek = sampler(peek_t)?;
                    note(&mut event, &peek, min);
                    if peek.elevation >= min {
                        event.rise = Some(candidate);
                    } else {
                        debug!("discarding transient rise at {:.6}", candidate.time.as_mjd());
                    }
                    phase = SearchPhase::Searching;
                    step = params.coarse_step;
                    t = peek_t;
                    sample = peek;
                } else if refine_count >= max_refine {
                    phase = SearchPhase::Searching;
                    step = params.coarse_step;
                    t = t_next;
                    sample = next;
                } else {
                    t = t_next;
                    sample = next;
                }
            }

            SearchPhase::Done => unreachable!(),
        }

        if event.rise.is_some() && event.set.is_some() {
            phase = SearchPhase::Done;
        }
    }

    Ok(event)
}

fn note(event: &mut PassEvent, sample: &HorizonSample, min: Degree) {
    if sample.elevation >= min {
        event.ever_up = true;
    } else {
        event.ever_down = true;
    }
}

#[cfg(test)]
mod pass_test {
    use super::*;

    /// Wrap a pure elevation profile (seconds since `now` → degrees) as a sampler.
    fn profile<F: Fn(f64) -> f64>(
        now: Instant,
        f: F,
    ) -> impl FnMut(Instant) -> Result<HorizonSample, FlyoverError> {
        move |t: Instant| {
            let x = (t - now) * 86_400.0;
            Ok(HorizonSample {
                elevation: f(x),
                azimuth: 180.0,
            })
        }
    }

    fn now() -> Instant {
        Instant::from_calendar(2024, 3, 1, 12, 0, 0.0)
    }

    #[test]
    fn test_never_visible() {
        let mut sampler = profile(now(), |_| -10.0);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();
        assert!(!event.found());
        assert!(!event.is_ever_up());
        assert!(event.is_ever_down());
    }

    #[test]
    fn test_always_visible_circumpolar() {
        let mut sampler = profile(now(), |_| 25.0);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();
        assert!(!event.found());
        assert!(event.is_ever_up());
        assert!(!event.is_ever_down());
    }

    #[test]
    fn test_triangle_pass_is_localized() {
        // linear rise at 0.05°/s from -10° starting at x=600, peak 20° at x=1200,
        // symmetric descent; crosses the 1° threshold at x=820 up and x=1580 down
        let shape = |x: f64| {
            if x < 600.0 {
                -10.0
            } else if x < 1200.0 {
                -10.0 + (x - 600.0) * 0.05
            } else if x < 1800.0 {
                20.0 - (x - 1200.0) * 0.05
            } else {
                -10.0
            }
        };
        let mut sampler = profile(now(), shape);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();

        assert!(event.found());
        assert!(event.is_ever_up() && event.is_ever_down());
        let rise_x = (event.rise_time().unwrap() - now()) * 86_400.0;
        let set_x = (event.set_time().unwrap() - now()) * 86_400.0;
        // fine step is 2 s, so crossings land within one fine step of truth
        assert!((rise_x - 820.0).abs() <= 3.0, "rise at {rise_x}");
        assert!((set_x - 1580.0).abs() <= 3.0, "set at {set_x}");
        assert!(event.rise_time().unwrap() > now());
        assert!(event.set_time().unwrap() > event.rise_time().unwrap());
    }

    #[test]
    fn test_false_rise_blip_is_suppressed() {
        // a 10-second spike above the threshold, gone again by the next coarse step
        let shape = |x: f64| {
            if (350.0..360.0).contains(&x) {
                6.0
            } else {
                -10.0
            }
        };
        let mut sampler = profile(now(), shape);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();

        assert!(!event.found());
        assert!(event.rise_time().is_none(), "blip must not be reported as a rise");
        // the spike was sampled, so the flags still show it
        assert!(event.is_ever_up());
        assert!(event.is_ever_down());
    }

    #[test]
    fn test_set_before_rise_when_starting_above() {
        // above the horizon at the start, down for a while, back up near the end
        let shape = |x: f64| {
            if x < 300.0 {
                5.0
            } else if x < 2000.0 {
                -10.0
            } else if x < 2100.0 {
                -10.0 + (x - 2000.0) * 0.2
            } else {
                10.0
            }
        };
        let mut sampler = profile(now(), shape);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();

        assert!(event.found());
        let set_x = (event.set_time().unwrap() - now()) * 86_400.0;
        let rise_x = (event.rise_time().unwrap() - now()) * 86_400.0;
        assert!(set_x < 302.0, "set at {set_x}");
        assert!((rise_x - 2055.0).abs() <= 5.0, "rise at {rise_x}");
        assert!(set_x < rise_x);
    }

    #[test]
    fn test_rise_without_set_is_not_found() {
        // comes up shortly after the start and stays up for the whole horizon
        let shape = |x: f64| if x < 500.0 { -5.0 } else { 15.0 };
        let mut sampler = profile(now(), shape);
        let event = search(&mut sampler, now(), &SearchParams::default()).unwrap();

        assert!(!event.found());
        assert!(event.rise_time().is_some());
        assert!(event.set_time().is_none());
        assert!(event.is_ever_up() && event.is_ever_down());
    }

    #[test]
    fn test_sampler_error_aborts_search() {
        let mut calls = 0;
        let mut sampler = |_t: Instant| {
            calls += 1;
            if calls > 3 {
                Err(FlyoverError::PropagationDegenerate {
                    eccentricity: 0.99,
                    mean_anomaly: 0.0,
                    iterations: 30,
                })
            } else {
                Ok(HorizonSample {
                    elevation: -10.0,
                    azimuth: 0.0,
                })
            }
        };
        let res = search(&mut sampler, now(), &SearchParams::default());
        assert!(res.is_err());
    }
}
