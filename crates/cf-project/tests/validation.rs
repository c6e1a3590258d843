use cf_project::{ProjectError, ValidationError, default_project, from_yaml_str, validate_project};
use proptest::prelude::*;

const MINIMAL: &str = r#"
version: 1
name: minimal
parameters:
  c1: 0.08
  c2: 1.33
  c3: 20.0
  c4: 0.18
  c5: 3.8
  c6: 4.0
  ed_l: 0.1
  ed_r: 0.03
  es_l: 2.0
  es_r: 0.4
  p0_l: 20.0
  p0_r: 8.0
  l1: 0.0005
  l2: 0.0005
  l3: 0.0005
  l4: 0.0005
  r1: 0.01
  r2: 0.067
  r3: 1.0
  r4: 0.005
  r5: 0.003
  r6: 0.03
  r7: 0.088
  r8: 0.005
  r_l: 0.01
  r_r: 0.01
  tc: 0.9
initial_state:
  aortic_pressure: 71.112
  arterial_systemic_flow: 8.880
  systemic_pressure: 70.516
  venous_systemic_flow: 67.337
  right_atrial_pressure: 3.328
  right_ventricle_volume: 105.520
  pulmonary_artery_pressure: 13.417
  arterial_pulmonary_flow: 0.786
  pulmonary_pressure: 13.393
  venous_pulmonary_flow: 23.836
  left_atrial_pressure: 11.294
  left_ventricle_volume: 112.760
simulation:
  t_end: 2.0
"#;

#[test]
fn minimal_yaml_loads() {
    let p = from_yaml_str(MINIMAL).unwrap();
    assert_eq!(p.simulation.t_start, 0.0);
    assert_eq!(p.simulation.graph_window_s, 1.8);
    assert_eq!(p.parameters.reflux, 0.0);
}

#[test]
fn missing_parameter_is_a_parse_error() {
    let text = MINIMAL.replace("  r5: 0.003\n", "");
    let err = from_yaml_str(&text).unwrap_err();
    assert!(matches!(err, ProjectError::Yaml(_)));
    assert!(err.to_string().contains("r5"));
}

#[test]
fn non_numeric_parameter_is_a_parse_error() {
    let text = MINIMAL.replace("  tc: 0.9\n", "  tc: fast\n");
    assert!(matches!(from_yaml_str(&text), Err(ProjectError::Yaml(_))));
}

#[test]
fn non_positive_parameter_rejected() {
    let text = MINIMAL.replace("  c3: 20.0\n", "  c3: 0.0\n");
    let err = from_yaml_str(&text).unwrap_err();
    match err {
        ProjectError::Validation(ValidationError::InvalidValue { field, .. }) => {
            assert_eq!(field, "parameters.c3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_file_version_rejected() {
    let text = MINIMAL.replace("version: 1\n", "version: 0\n");
    assert!(matches!(
        from_yaml_str(&text),
        Err(ProjectError::Validation(ValidationError::UnsupportedVersion { version: 0 }))
    ));
}

#[test]
fn reflux_out_of_range_rejected() {
    let text = MINIMAL.replace("  tc: 0.9\n", "  tc: 0.9\n  reflux: 1.5\n");
    assert!(matches!(
        from_yaml_str(&text),
        Err(ProjectError::Validation(ValidationError::InvalidValue { .. }))
    ));
}

#[test]
fn bad_time_settings_rejected() {
    let mut p = default_project();
    p.simulation.t_end = p.simulation.t_start;
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.simulation.t_eval = Some(vec![0.0, 2.0, 1.0]);
    let err = validate_project(&p).unwrap_err();
    assert!(err.to_string().contains("strictly increasing"));

    let mut p = default_project();
    p.simulation.t_eval = Some(vec![0.0, 500.0]);
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.simulation.samples = Some(1);
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.simulation.graph_window_s = 0.0;
    assert!(validate_project(&p).is_err());
}

#[test]
fn bad_solver_settings_rejected() {
    let mut p = default_project();
    p.solver.atol = 0.0;
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.solver.rtol = f64::NAN;
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.solver.max_steps = 0;
    assert!(validate_project(&p).is_err());

    let mut p = default_project();
    p.solver.h_min = 1e-3;
    p.solver.h_max = Some(1e-4);
    assert!(validate_project(&p).is_err());
}

proptest! {
    #[test]
    fn scaled_parameters_stay_valid(scale in 0.1f64..10.0, reflux in 0.0f64..0.99) {
        let mut p = default_project();
        let params = &mut p.parameters;
        params.c1 *= scale;
        params.r3 *= scale;
        params.l2 *= scale;
        params.es_l *= scale;
        params.reflux = reflux;
        prop_assert!(validate_project(&p).is_ok());
    }
}
