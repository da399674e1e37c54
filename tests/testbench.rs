use ferrum_reg::prelude::*;

#[test]
fn demo_stimulus() {
    let config =
        SimConfig::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/scenarios.json")).unwrap();
    let cycles = config.cycles.clone();

    let outputs = Testbench::from_config(&config)
        .unwrap()
        .run(&cycles, &RunOpts::default())
        .unwrap();

    assert_eq!(outputs, [0xAB, 0x00, 0x00, 0x01, 0x02, 0x03, 0x03, 0x2C]);
}

#[test]
fn register_is_wired_to_config() {
    let config = SimConfig::from_json(r#"{ "width": 12, "reset_polarity": "active_low" }"#).unwrap();
    let bench = Testbench::from_config(&config).unwrap();

    assert_eq!(bench.register().width().get(), 12);
    assert_eq!(bench.register().output(), 0);
    assert_eq!(bench.register().name(), "reg");
}

#[test]
fn inputs_hold_between_cycles() {
    let config = SimConfig::default();
    let bench = Testbench::from_config(&config).unwrap();

    let outputs = bench
        .run(
            &[CycleInput::data(7), CycleInput::data(7), CycleInput::default()],
            &RunOpts::default(),
        )
        .unwrap();

    assert_eq!(outputs, [7, 7, 0]);
}
