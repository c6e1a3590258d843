use cf_project::schema::*;
use cf_project::{
    default_project, from_json_str, from_yaml_str, load, load_yaml, save, save_yaml,
    to_yaml_string, validate_project,
};

#[test]
fn roundtrip_yaml_default_project() {
    let project = default_project();
    validate_project(&project).unwrap();

    let temp_dir = std::env::temp_dir();
    let path = temp_dir.join("cf_project_roundtrip_default.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_with_explicit_times() {
    let mut project = default_project();
    project.name = "Explicit times".to_string();
    project.simulation.t_end = 1.8;
    project.simulation.t_eval = Some(vec![0.0, 0.45, 0.9, 1.35, 1.8]);
    project.parameters.reflux = 0.02;
    project.solver.h_max = Some(1e-3);

    let path = std::env::temp_dir().join("cf_project_roundtrip_times.json");
    save(&path, &project).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(project, loaded);
    assert_eq!(
        loaded.simulation.sampling(),
        Sampling::Explicit(vec![0.0, 0.45, 0.9, 1.35, 1.8])
    );
}

#[test]
fn yaml_string_roundtrip() {
    let mut project = default_project();
    project.simulation.samples = Some(2001);
    let text = to_yaml_string(&project).unwrap();
    assert!(text.contains("samples: 2001"));
    let loaded = from_yaml_str(&text).unwrap();
    assert_eq!(loaded.simulation.sampling(), Sampling::Uniform(2001));
}

#[test]
fn optional_sections_take_defaults() {
    let yaml = to_yaml_string(&default_project()).unwrap();
    // Drop solver section and reflux key entirely.
    let trimmed: String = yaml
        .lines()
        .take_while(|l| !l.starts_with("solver:"))
        .filter(|l| !l.trim_start().starts_with("reflux:"))
        .map(|l| format!("{l}\n"))
        .collect();
    let loaded = from_yaml_str(&trimmed).unwrap();
    assert_eq!(loaded.solver, SolverDef::default());
    assert_eq!(loaded.parameters.reflux, 0.0);
    assert_eq!(loaded.simulation.sampling(), Sampling::Steps);
}

#[test]
fn unknown_extension_rejected() {
    let path = std::env::temp_dir().join("cf_project.toml");
    assert!(matches!(
        load(&path),
        Err(cf_project::ProjectError::UnknownFormat { .. })
    ));
}

#[test]
fn json_from_string() {
    let project = default_project();
    let text = serde_json::to_string(&project).unwrap();
    assert_eq!(from_json_str(&text).unwrap(), project);
}
