//! Scenario runner that drives a scene through its steps.

use crate::assert::{
    evaluate_assert_listeners, evaluate_assert_state, evaluate_assert_style, evaluate_assert_text,
    AssertionResult, ExpectedStyle,
};
use crate::report::{RunReport, RunStats};
use crate::scenario::{Scenario, ScenarioStep};
use crate::scene::{LoadedScene, Scene};
use anyhow::{bail, Result};

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: RunReport },
    Failed { report: RunReport },
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Build the scene and run every step; stops at the first failed assertion
pub fn run(scene: &Scene, scenario: &Scenario) -> Result<RunOutcome> {
    let loaded = scene.build()?;
    run_loaded(&loaded, scenario)
}

/// Run steps against an already built scene
pub fn run_loaded(scene: &LoadedScene, scenario: &Scenario) -> Result<RunOutcome> {
    let runtime = &scene.runtime;
    let frame_ms = scenario
        .frame_ms
        .unwrap_or_else(|| runtime.frame_interval_ms());
    if !frame_ms.is_finite() || frame_ms <= 0.0 {
        bail!("frame_ms must be a positive number, got {frame_ms}");
    }

    let mut stats = RunStats::default();
    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::trace!(step_index, ?step, "scenario step");
        let result = match step {
            ScenarioStep::ScrollTo { y } => {
                runtime.scroll_to(*y);
                AssertionResult::Passed
            }
            ScenarioStep::ScrollBy { dy } => {
                runtime.scroll_by(*dy);
                AssertionResult::Passed
            }
            ScenarioStep::Resize { width, height } => {
                runtime.resize(*width, *height);
                AssertionResult::Passed
            }
            ScenarioStep::PointerMove { x, y } => {
                runtime.pointer_move(*x, *y);
                AssertionResult::Passed
            }
            ScenarioStep::PointerLeave => {
                runtime.pointer_leave();
                AssertionResult::Passed
            }
            ScenarioStep::Wait { ms } => {
                let ms = ms.max(0.0);
                let mut remaining = ms;
                while remaining > 0.0 {
                    let dt = frame_ms.min(remaining);
                    runtime.tick(dt);
                    remaining -= dt;
                    stats.elapsed_frames += 1;
                }
                stats.elapsed_ms += f64::from(ms);
                AssertionResult::Passed
            }
            ScenarioStep::Tick { frames } => {
                for _ in 0..*frames {
                    runtime.tick(frame_ms);
                }
                stats.elapsed_frames += u64::from(*frames);
                stats.elapsed_ms += f64::from(frame_ms) * f64::from(*frames);
                AssertionResult::Passed
            }
            ScenarioStep::Release { binding } => {
                scene.context.release(scene.binding(binding)?);
                AssertionResult::Passed
            }
            ScenarioStep::Revert => {
                scene.context.revert();
                AssertionResult::Passed
            }
            ScenarioStep::AssertStyle {
                element,
                opacity,
                x,
                y,
                scale,
                rotate,
                tolerance,
            } => {
                let expected = ExpectedStyle {
                    opacity: *opacity,
                    x: *x,
                    y: *y,
                    scale: *scale,
                    rotate: *rotate,
                };
                let style = runtime.style(scene.element(element)?);
                evaluate_assert_style(element, style, &expected, *tolerance)
            }
            ScenarioStep::AssertText {
                element,
                value,
                contains,
            } => {
                let text = runtime.text_content(scene.element(element)?);
                evaluate_assert_text(element, text, value, *contains)
            }
            ScenarioStep::AssertState { binding, state } => {
                let actual = runtime.state(scene.binding(binding)?);
                evaluate_assert_state(binding, actual, state)
            }
            ScenarioStep::AssertListeners { count } => {
                evaluate_assert_listeners(runtime.listener_count(), *count)
            }
        };
        stats.steps_run = step_index + 1;

        if let AssertionResult::Failed { code, message } = result {
            stats.bindings = runtime.binding_count();
            stats.listeners = runtime.listener_count();
            let assertion = step.assertion().unwrap_or("step");
            tracing::debug!(step_index, assertion, %message, "assertion failed");
            let report = RunReport::failed(assertion, step_index, code, message, stats);
            return Ok(RunOutcome::Failed { report });
        }
    }

    stats.bindings = runtime.binding_count();
    stats.listeners = runtime.listener_count();
    Ok(RunOutcome::Passed {
        report: RunReport::passed(stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        [viewport]
        width = 1280
        height = 800

        [[elements]]
        name = "card"
        rect = [0, 1200, 400, 300]

        [[elements]]
        name = "stat"
        rect = [0, 1600, 200, 60]
        text = "78000+"

        [[bindings]]
        type = "reveal"
        id = "card-reveal"
        element = "card"
        animation = "fadeUp"
        duration = 0.8
        start = "top 85%"

        [[bindings]]
        type = "counter"
        id = "farmers"
        element = "stat"
        end = 78000
        prefix = "₹"
        duration = 1.5
    "#;

    fn run_json(steps: &str) -> RunOutcome {
        let scene = Scene::from_toml_str(SCENE).unwrap();
        let scenario =
            Scenario::from_json(&format!(r#"{{ "frame_ms": 16, "steps": {steps} }}"#)).unwrap();
        run(&scene, &scenario).unwrap()
    }

    #[test]
    fn test_fade_up_scenario_passes() {
        let outcome = run_json(
            r#"[
                { "type": "assert_style", "element": "card", "opacity": 0, "y": 60 },
                { "type": "assert_text", "element": "stat", "value": "₹0" },
                { "type": "scroll_to", "y": 1000 },
                { "type": "assert_state", "binding": "card-reveal", "state": "playing" },
                { "type": "wait", "ms": 1500 },
                { "type": "assert_style", "element": "card", "opacity": 1, "y": 0 },
                { "type": "assert_text", "element": "stat", "value": "₹78000" },
                { "type": "assert_state", "binding": "farmers", "state": "at_rest" },
                { "type": "revert" },
                { "type": "assert_text", "element": "stat", "value": "78000+" },
                { "type": "assert_listeners", "count": 0 }
            ]"#,
        );
        assert!(!outcome.is_failed(), "{:?}", outcome.report());
        let report = outcome.report();
        assert_eq!(report.steps_run, 11);
        assert_eq!(report.elapsed_ms, 1500.0);
        assert_eq!(report.bindings, 0);
    }

    #[test]
    fn test_failed_assertion_reports_step() {
        let outcome = run_json(
            r#"[
                { "type": "scroll_to", "y": 100 },
                { "type": "wait", "ms": 32 },
                { "type": "assert_style", "element": "card", "opacity": 1 }
            ]"#,
        );
        assert!(outcome.is_failed());
        let report = outcome.report();
        assert_eq!(report.failed_step_index, Some(2));
        assert_eq!(report.assertion.as_deref(), Some("assert_style"));
        assert_eq!(report.code.as_deref(), Some("style_mismatch"));
        assert_eq!(report.elapsed_frames, 2);
        assert_eq!(report.listeners, 4);
    }

    #[test]
    fn test_unknown_binding_is_an_error() {
        let scene = Scene::from_toml_str(SCENE).unwrap();
        let scenario = Scenario::from_json(
            r#"{ "steps": [{ "type": "assert_state", "binding": "nope", "state": "armed" }] }"#,
        )
        .unwrap();
        assert!(run(&scene, &scenario).is_err());
    }
}
