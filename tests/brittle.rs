mod common;

use common::{assert_close, table};
use rbi_damage_toolbox::aging::{default_additive_pairs, AdditivePair};
use rbi_damage_toolbox::brittle::{
    base_damage_factor, base_df_table_name, compute_brittle_family, compute_carbon_steel_brittle,
    compute_embrittlement_885, compute_temper_embrittlement, delta_fatt_fabrication_year, delta_fatt_j_factor,
    delta_fatt_service_life, delta_fatt_x_bar, embrittlement_885_df, reference_table_name, reference_temperature,
    sigma_phase_df, BrittleFamilyInput, CarbonSteelBrittleInput, CriticalTemperature, DeltaFattMethod,
    Embrittlement885Input, ExemptionCurve, SigmaContent, SigmaPhaseInput, SteelFamily, TemperEmbrittlementInput,
    EMBRITTLEMENT_885_TABLE, SIGMA_TABLE,
};
use rbi_damage_toolbox::error::CalcError;
use rbi_damage_toolbox::tables::{LookupTable, TableStore};
use rbi_damage_toolbox::units::TemperatureScale;
use serde_json::json;

fn tref_table() -> LookupTable {
    table(
        "table_2_e_3_3",
        json!({
            "carbon_steels": [
                {"min_yield_strength": 40, "curve_a": 120, "curve_b": 80, "curve_c": 40, "curve_d": 20},
                {"min_yield_strength": 30, "curve_a": 100, "curve_b": 60, "curve_c": 30, "curve_d": 10}
            ],
            "low_alloy_steels": [
                {"min_yield_strength": 30, "curve_a": 90, "curve_b": 50, "curve_c": 20, "curve_d": 0}
            ]
        }),
    )
}

fn base_table(name: &str) -> LookupTable {
    table(
        name,
        json!({
            "thicknesses": [0.25, 0.5, 1.0],
            "rows": [
                {"delta_t": 100, "values": [0, 0, 0]},
                {"delta_t": 0, "values": [1, 2, 4]},
                {"delta_t": -100, "values": [10, 20, 40]}
            ]
        }),
    )
}

fn table_885() -> LookupTable {
    table(
        EMBRITTLEMENT_885_TABLE,
        json!([
            {"temp_diff_f": 100, "df": 0},
            {"temp_diff_f": 0, "df": 100},
            {"temp_diff_f": -100, "df": 1381}
        ]),
    )
}

fn sigma_table() -> LookupTable {
    table(
        SIGMA_TABLE,
        json!([
            {"temp_f": 1200, "df_low": 0, "df_medium": 0, "df_high": 0},
            {"temp_f": 70, "df_low": 0.1, "df_medium": 1.3, "df_high": 2.0},
            {"temp_f": -50, "df_low": 0.5, "df_medium": 4.123, "df_high": 11.0}
        ]),
    )
}

fn carbon_input() -> CarbonSteelBrittleInput {
    CarbonSteelBrittleInput {
        critical_exposure: CriticalTemperature::AdministrativeControls {
            min_operating_temp: 160.0,
        },
        family: SteelFamily::CarbonSteel,
        curve: ExemptionCurve::A,
        yield_strength: 35.0,
        thickness: 0.5,
        pwht: false,
        fse: 2.0,
    }
}

fn temper_input() -> TemperEmbrittlementInput {
    TemperEmbrittlementInput {
        min_operating_temp: 100.0,
        admin_controls: true,
        tmdt: None,
        process_mpt: None,
        family: SteelFamily::CarbonSteel,
        curve: ExemptionCurve::A,
        yield_strength: 35.0,
        delta_fatt: DeltaFattMethod::FabricationYear { year: 1990 },
        thickness: 1.0,
        pwht: true,
        fse: 1.0,
    }
}

#[test]
fn delta_fatt_methods() {
    assert_close(delta_fatt_service_life(100.0, 10.0).unwrap(), 270.18, 0.01);
    assert!(matches!(delta_fatt_service_life(100.0, 0.0), Err(CalcError::MissingInput(_))));
    assert_close(delta_fatt_j_factor(0.2, 0.5, 0.01, 0.01), -7.5318, 1e-3);
    assert_close(delta_fatt_x_bar(0.01, 0.001, 0.01, 0.01), 54.5737, 1e-3);
    assert_eq!(delta_fatt_fabrication_year(1989), 150.0);
    assert_eq!(delta_fatt_fabrication_year(1988), 250.0);
    assert_eq!(delta_fatt_fabrication_year(1981), 250.0);
    assert_eq!(delta_fatt_fabrication_year(1980), 300.0);
    assert_eq!(delta_fatt_fabrication_year(1973), 300.0);
    assert_eq!(delta_fatt_fabrication_year(1972), 350.0);
    assert_eq!(DeltaFattMethod::Known { delta_fatt: 42.0 }.delta_fatt().unwrap(), 42.0);
}

#[test]
fn table_names_follow_scale_and_pwht() {
    assert_eq!(reference_table_name(TemperatureScale::Celsius), "table_2_e_3_3m");
    assert_eq!(base_df_table_name(false, TemperatureScale::Fahrenheit), "table_2_e_3_4");
    assert_eq!(base_df_table_name(true, TemperatureScale::Celsius), "table_2_e_3_5m");
}

#[test]
fn reference_temperature_interpolates_and_clamps() {
    let t = tref_table();
    let tref = |ys| reference_temperature(&t, SteelFamily::CarbonSteel, ExemptionCurve::A, ys).unwrap();
    assert_close(tref(35.0), 110.0, 1e-12);
    assert_eq!(tref(50.0), 120.0);
    assert_eq!(tref(10.0), 100.0);
    assert_eq!(
        reference_temperature(&t, SteelFamily::LowAlloySteel, ExemptionCurve::D, 99.0).unwrap(),
        0.0
    );
}

#[test]
fn base_df_is_bilinear_and_clamped() {
    let t = base_table("table_2_e_3_4");
    assert_close(base_damage_factor(&t, 50.0, 0.5).unwrap(), 1.0, 1e-12);
    assert_close(base_damage_factor(&t, -50.0, 0.75).unwrap(), 16.5, 1e-12);
    assert_eq!(base_damage_factor(&t, -500.0, 5.0).unwrap(), 40.0);
    assert_eq!(base_damage_factor(&t, 500.0, 0.1).unwrap(), 0.0);
}

#[test]
fn ragged_base_df_table_is_a_shape_error() {
    let t = table("bad", json!({"thicknesses": [0.25, 0.5], "rows": [{"delta_t": 0, "values": [1]}]}));
    assert!(matches!(base_damage_factor(&t, 0.0, 0.25), Err(CalcError::Table(_))));
}

#[test]
fn carbon_steel_brittle_fracture() {
    let r = compute_carbon_steel_brittle(&carbon_input(), &tref_table(), &base_table("table_2_e_3_4")).unwrap();
    assert_eq!(r.cet, 160.0);
    assert_close(r.tref, 110.0, 1e-12);
    assert_close(r.delta_t, 50.0, 1e-12);
    assert_close(r.base_df, 1.0, 1e-12);
    assert_close(r.damage_factor, 2.0, 1e-12);
}

#[test]
fn temper_embrittlement_uses_mpt() {
    let r = compute_temper_embrittlement(&temper_input(), &tref_table(), &base_table("table_2_e_3_5")).unwrap();
    assert_eq!(r.delta_fatt, 150.0);
    assert_close(r.mpt, 260.0, 1e-12);
    assert_close(r.delta_t, -160.0, 1e-12);
    assert_eq!(r.damage_factor, 40.0);
    assert_eq!(r.cet, 100.0);
}

#[test]
fn temper_without_admin_controls_needs_design_temperatures() {
    let mut inp = temper_input();
    inp.admin_controls = false;
    let err = compute_temper_embrittlement(&inp, &tref_table(), &base_table("t")).unwrap_err();
    assert!(matches!(err, CalcError::MissingInput("tmdt")));
    inp.tmdt = Some(50.0);
    inp.process_mpt = Some(70.0);
    let r = compute_temper_embrittlement(&inp, &tref_table(), &base_table("t")).unwrap();
    assert_eq!(r.cet, 50.0);
}

#[test]
fn embrittlement_885_cutoffs_and_rounding() {
    let t = table_885();
    assert_eq!(embrittlement_885_df(&t, 150.0).unwrap(), 0.0);
    assert_eq!(embrittlement_885_df(&t, -150.0).unwrap(), 1381.0);
    assert_eq!(embrittlement_885_df(&t, 50.0).unwrap(), 50.0);
    assert_eq!(embrittlement_885_df(&t, -50.0).unwrap(), 741.0);

    let inp = Embrittlement885Input {
        admin_controls: false,
        min_operating_temp: None,
        design_min_temp: Some(20.0),
        upset_temp: Some(30.0),
        tref: None,
    };
    let r = compute_embrittlement_885(&inp, &t).unwrap();
    assert_eq!((r.t_min, r.tref, r.temp_diff), (20.0, 80.0, -60.0));
    assert_eq!(r.damage_factor, 869.0);
}

#[test]
fn sigma_phase_rounds_to_two_decimals() {
    let t = sigma_table();
    assert_eq!(sigma_phase_df(&t, 10.0, SigmaContent::Medium).unwrap(), 2.71);
    assert_eq!(sigma_phase_df(&t, 2000.0, SigmaContent::High).unwrap(), 0.0);
    assert_eq!(sigma_phase_df(&t, -100.0, SigmaContent::High).unwrap(), 11.0);
}

#[test]
fn family_governing_adds_brittle_and_temper() {
    let mut store = TableStore::new("unused");
    store.insert(tref_table());
    store.insert(base_table("table_2_e_3_4"));
    store.insert(base_table("table_2_e_3_5"));
    store.insert(table_885());
    store.insert(sigma_table());

    let input = BrittleFamilyInput {
        scale: TemperatureScale::Fahrenheit,
        carbon_steel: Some(carbon_input()),
        temper_embrittlement: Some(temper_input()),
        embrittlement_885: None,
        sigma_phase: Some(SigmaPhaseInput {
            min_operating_temp: -100.0,
            content: SigmaContent::High,
        }),
    };
    let names = input.required_tables();
    assert!(names.contains(&"table_2_e_3_3") && names.contains(&SIGMA_TABLE));
    assert!(!names.contains(&EMBRITTLEMENT_885_TABLE));

    let r = compute_brittle_family(&input, &store, &default_additive_pairs()).unwrap();
    assert_close(r.governing_df, 42.0, 1e-12);

    let r = compute_brittle_family(&input, &store, &[] as &[AdditivePair]).unwrap();
    assert_close(r.governing_df, 40.0, 1e-12);
}

#[test]
fn family_converts_celsius_before_fahrenheit_only_tables() {
    let mut store = TableStore::new("unused");
    store.insert(table_885());
    store.insert(sigma_table());
    let mut input = BrittleFamilyInput {
        scale: TemperatureScale::Celsius,
        embrittlement_885: Some(Embrittlement885Input {
            admin_controls: true,
            min_operating_temp: Some(10.0),
            design_min_temp: None,
            upset_temp: None,
            tref: None,
        }),
        sigma_phase: Some(SigmaPhaseInput {
            min_operating_temp: 0.0,
            content: SigmaContent::Medium,
        }),
        ..BrittleFamilyInput::default()
    };

    let r = compute_brittle_family(&input, &store, &default_additive_pairs()).unwrap();
    let e885 = r.embrittlement_885.unwrap();
    assert_close(e885.t_min, 50.0, 1e-9);
    assert_close(e885.temp_diff, -30.0, 1e-9);
    assert_eq!(e885.damage_factor, 484.0);
    assert_eq!(r.sigma_phase_df, Some(2.19));

    input.scale = TemperatureScale::Fahrenheit;
    let r = compute_brittle_family(&input, &store, &default_additive_pairs()).unwrap();
    assert_eq!(r.sigma_phase_df, Some(2.95));
}

#[test]
fn family_reports_tables_not_loaded() {
    let store = TableStore::new("unused");
    let input = BrittleFamilyInput {
        sigma_phase: Some(SigmaPhaseInput {
            min_operating_temp: 100.0,
            content: SigmaContent::Low,
        }),
        ..BrittleFamilyInput::default()
    };
    let err = compute_brittle_family(&input, &store, &default_additive_pairs()).unwrap_err();
    assert!(matches!(err, CalcError::Table(_)));
}
