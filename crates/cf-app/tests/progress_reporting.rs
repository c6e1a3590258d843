use cf_app::{RunOptions, RunProgressEvent, RunStage, run_project_with_progress};
use cf_project::default_project;

#[test]
fn progress_events_in_stage_order() {
    let mut project = default_project();
    project.simulation.t_end = 0.9;

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let cb: &mut dyn FnMut(RunProgressEvent) = &mut |e| events.push(e);
    let run = run_project_with_progress(&project, &RunOptions::default(), Some(cb)).unwrap();

    assert_eq!(events.first().unwrap().stage, RunStage::BuildingModel);
    assert_eq!(events.last().unwrap().stage, RunStage::Completed);

    let integrating: Vec<_> = events
        .iter()
        .filter_map(|e| e.integration.as_ref())
        .collect();
    assert!(!integrating.is_empty());
    assert!(
        integrating
            .windows(2)
            .all(|w| w[1].sim_time_s >= w[0].sim_time_s)
    );
    let last = integrating.last().unwrap();
    assert_eq!(last.fraction_complete, 1.0);
    assert_eq!(last.accepted_steps, run.stats().accepted_steps);
}
