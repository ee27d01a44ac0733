mod common;

use common::assert_close;
use rbi_damage_toolbox::error::CalcError;
use rbi_damage_toolbox::htha::{
    assess_htha, htha_damage_factor, margin_susceptibility, nelson_limit_f, HthaInput, HthaMaterial,
};
use rbi_damage_toolbox::scc::Susceptibility;
use rbi_damage_toolbox::units::TemperatureScale;
use serde_json::json;

fn input(material: HthaMaterial, temp_f: f64, pressure: f64, years: f64) -> HthaInput {
    HthaInput {
        scale: TemperatureScale::Fahrenheit,
        material,
        temperature: temp_f,
        h2_partial_pressure: pressure,
        exposure_years: years,
        damage_observed: false,
    }
}

#[test]
fn nelson_limits_by_material() {
    assert_close(nelson_limit_f(HthaMaterial::CarbonSteel, 100.0).unwrap(), 595.0, 1e-9);
    assert_eq!(nelson_limit_f(HthaMaterial::CarbonSteel, 3000.0), Some(400.0));
    assert_eq!(nelson_limit_f(HthaMaterial::CarbonSteel, 20.0), None);
    assert_close(nelson_limit_f(HthaMaterial::Cr125Mo05, 500.0).unwrap(), 940.0, 1e-9);
    assert_eq!(nelson_limit_f(HthaMaterial::Cr225Mo1, 20.0), Some(1100.0));
    assert_eq!(nelson_limit_f(HthaMaterial::Cr5Mo05, 2000.0), None);
    assert_eq!(nelson_limit_f(HthaMaterial::Other, 200.0), Some(500.0));
}

#[test]
fn margin_bands_include_their_lower_edge() {
    assert_eq!(margin_susceptibility(0.0), Susceptibility::High);
    assert_eq!(margin_susceptibility(-50.0), Susceptibility::Medium);
    assert_eq!(margin_susceptibility(-100.0), Susceptibility::Low);
    assert_eq!(margin_susceptibility(-100.5), Susceptibility::None);
}

#[test]
fn damage_factor_follows_exposure_bands() {
    assert_eq!(htha_damage_factor(Susceptibility::High, 0.5), 10.0);
    assert_eq!(htha_damage_factor(Susceptibility::High, 3.0), 500.0);
    assert_eq!(htha_damage_factor(Susceptibility::High, 5.0), 5000.0);
    assert_eq!(htha_damage_factor(Susceptibility::Medium, 4.0), 0.0);
    assert_eq!(htha_damage_factor(Susceptibility::Medium, 12.0), 500.0);
    assert_eq!(htha_damage_factor(Susceptibility::Low, 25.0), 100.0);
    assert_eq!(htha_damage_factor(Susceptibility::None, 40.0), 0.0);
}

#[test]
fn carbon_steel_margin_sets_susceptibility() {
    let r = assess_htha(&input(HthaMaterial::CarbonSteel, 600.0, 100.0, 3.0)).unwrap();
    assert_eq!(r.susceptibility, Susceptibility::High);
    assert_close(r.margin_f.unwrap(), 5.0, 1e-9);
    assert_eq!(r.damage_factor, 500.0);
    assert_eq!(r.pof_category, 3);

    let r = assess_htha(&input(HthaMaterial::CarbonSteel, 560.0, 100.0, 12.0)).unwrap();
    assert_eq!(r.susceptibility, Susceptibility::Medium);
    assert_eq!(r.damage_factor, 500.0);

    let r = assess_htha(&input(HthaMaterial::CarbonSteel, 480.0, 100.0, 30.0)).unwrap();
    assert_eq!(r.susceptibility, Susceptibility::None);
    assert_eq!(r.damage_factor, 0.0);
    assert_eq!(r.pof_category, 0);
}

#[test]
fn screening_and_immune_materials_score_zero() {
    let cool = assess_htha(&input(HthaMaterial::CarbonSteel, 300.0, 500.0, 20.0)).unwrap();
    assert_eq!(cool.susceptibility, Susceptibility::None);
    assert_eq!(cool.limit_temperature_f, None);

    let low_pressure = assess_htha(&input(HthaMaterial::Other, 900.0, 40.0, 20.0)).unwrap();
    assert_eq!(low_pressure.damage_factor, 0.0);

    let immune = assess_htha(&input(HthaMaterial::Cr5Mo05, 1000.0, 2000.0, 20.0)).unwrap();
    assert_eq!(immune.susceptibility, Susceptibility::None);
    assert_eq!(immune.margin_f, None);
}

#[test]
fn observed_damage_skips_temperature() {
    let seen = HthaInput {
        temperature: f64::NAN,
        damage_observed: true,
        ..input(HthaMaterial::CarbonSteel, 0.0, 0.0, 0.5)
    };
    let r = assess_htha(&seen).unwrap();
    assert_eq!(r.susceptibility, Susceptibility::High);
    assert_eq!(r.damage_factor, 10.0);

    let no_years = input(HthaMaterial::CarbonSteel, 600.0, 100.0, f64::NAN);
    assert!(matches!(assess_htha(&no_years), Err(CalcError::MissingInput("exposure_years"))));
}

#[test]
fn celsius_input_is_converted_and_materials_deserialize() {
    // 316°C = 600.8°F
    let celsius = HthaInput {
        scale: TemperatureScale::Celsius,
        ..input(HthaMaterial::CarbonSteel, 316.0, 100.0, 2.0)
    };
    let r = assess_htha(&celsius).unwrap();
    assert_eq!(r.susceptibility, Susceptibility::High);
    assert_close(r.margin_f.unwrap(), 5.8, 1e-9);

    let parsed: HthaInput = serde_json::from_value(json!({
        "scale": "Fahrenheit",
        "material": "1.25Cr-0.5Mo",
        "temperature": 860.0,
        "h2_partial_pressure": 500.0,
        "exposure_years": 8.0
    }))
    .unwrap();
    assert_eq!(parsed.material, HthaMaterial::Cr125Mo05);
    assert_eq!(assess_htha(&parsed).unwrap().susceptibility, Susceptibility::Low);
}
