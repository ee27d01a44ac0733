mod common;

use common::{assert_close, table};
use rbi_damage_toolbox::error::CalcError;
use rbi_damage_toolbox::interpolation::RangeFlag;
use rbi_damage_toolbox::tables::LookupTable;
use rbi_damage_toolbox::thinning::alkaline_sour_water::{
    compute_alkaline_sour_water, pressure_adjusted_rate, AlkalineSourWaterInput,
};
use rbi_damage_toolbox::thinning::amine::{
    compute_amine_carbon_steel, compute_amine_stainless, velocity_band, AmineCarbonSteelInput, AmineStainlessInput,
    AmineType,
};
use rbi_damage_toolbox::thinning::co2::{
    base_rate_mm_y, compute_co2, dew_point_f, fugacity_bar, glycol_factor, inhibitor_factor, Co2Input,
};
use rbi_damage_toolbox::thinning::hcl::{
    alloy_chloride_row, chloride_from_ph, compute_hcl, ph_from_chloride, HclInput, HclMaterial,
};
use rbi_damage_toolbox::thinning::ht_h2s_h2::{compute_h2s_h2, H2sH2Input, H2sH2Material, Hydrocarbon};
use rbi_damage_toolbox::thinning::ht_oxidation::{compute_ht_oxidation, HtOxidationInput, OxidationMaterial};
use rbi_damage_toolbox::thinning::hydrofluoric::{compute_hf, HfInput, HfMaterial};
use rbi_damage_toolbox::thinning::naphthenic::{compute_naphthenic, NaphthenicInput, NaphthenicMaterial};
use rbi_damage_toolbox::thinning::soil_side::{
    coating_factor, compute_soil_side, CoatingCondition, SoilSideInput, SoilSideTables,
};
use rbi_damage_toolbox::thinning::sour_water::{compute_sour_water, velocity_factor, SourWaterInput};
use rbi_damage_toolbox::thinning::sulfuric::{compute_sulfuric, SulfuricInput, SulfuricMaterial};
use rbi_damage_toolbox::units::{fahrenheit_to_celsius, psi_to_bar, TemperatureScale};
use serde_json::json;

fn co2_input() -> Co2Input {
    Co2Input {
        carbon_steel: true,
        operating_temp_f: 150.0,
        pressure_psia: 100.0,
        water_percent: None,
        co2_mol_percent: 10.0,
        ph: 5.0,
        shear_stress_pa: 19.0,
        glycol_percent: None,
        inhibitor_efficiency: None,
    }
}

fn co2_table() -> rbi_damage_toolbox::tables::LookupTable {
    table(
        "table_2b132",
        json!({"temperature_in_f": {"100": {"4": 1.0, "6": 0.5}, "200": {"4": 2.0, "6": 1.0}}}),
    )
}

#[test]
fn co2_rate_follows_the_fugacity_model() {
    let r = compute_co2(&co2_input(), &co2_table()).unwrap();
    assert_close(r.f_t_ph, 1.125, 1e-12);
    let p_co2 = 0.1 * psi_to_bar(100.0);
    assert_close(r.co2_partial_pressure_bar, p_co2, 1e-12);
    let expected = base_rate_mm_y(1.125, fugacity_bar(p_co2, fahrenheit_to_celsius(150.0)), 19.0) * 39.4;
    assert_close(r.corrosion_rate_mpy, expected, 1e-9);
    assert!(r.liquid_water);
}

#[test]
fn co2_above_dew_point_has_no_liquid_water() {
    let td = dew_point_f(50.0, 100.0).unwrap();
    assert_close(td, 296.6, 0.5);
    let mut inp = co2_input();
    inp.water_percent = Some(50.0);
    inp.operating_temp_f = 350.0;
    let r = compute_co2(&inp, &co2_table()).unwrap();
    assert!(!r.liquid_water);
    assert_eq!(r.corrosion_rate_mpy, 0.0);
    assert_eq!(r.warnings.len(), 1);
}

#[test]
fn co2_mitigation_factors() {
    assert_eq!(glycol_factor(0.0), 1.0);
    assert_eq!(glycol_factor(100.0), 0.008);
    assert_close(glycol_factor(50.0), 0.33, 0.005);
    assert_close(inhibitor_factor(80.0), 0.2, 1e-12);

    let base = compute_co2(&co2_input(), &co2_table()).unwrap().corrosion_rate_mpy;
    let mut inp = co2_input();
    inp.glycol_percent = Some(50.0);
    inp.inhibitor_efficiency = Some(80.0);
    let r = compute_co2(&inp, &co2_table()).unwrap();
    assert_close(r.corrosion_rate_mpy, base * glycol_factor(50.0) * 0.2, 1e-9);
}

#[test]
fn co2_non_carbon_steel_is_zero() {
    let mut inp = co2_input();
    inp.carbon_steel = false;
    inp.ph = f64::NAN;
    assert_eq!(compute_co2(&inp, &co2_table()).unwrap().corrosion_rate_mpy, 0.0);
}

#[test]
fn sour_water_combines_base_oxygen_and_velocity() {
    let base = table(
        "table_2b102",
        json!({"temperature_in_f": {"100": {"4": 10.0, "6": 4.0}, "200": {"4": 20.0, "6": 8.0}}}),
    );
    let oxygen = table("table_2b103", json!({"adjustment_factor": [1.0, 2.0]}));
    let inp = SourWaterInput {
        scale: TemperatureScale::Fahrenheit,
        carbon_steel: true,
        cladding_carbon_steel: Some(false),
        ph: 5.0,
        temperature: 150.0,
        oxygen_ppb: 60.0,
        velocity: 10.0,
    };
    let r = compute_sour_water(&inp, &base, &oxygen).unwrap();
    assert_close(r.base_rate, 10.5, 1e-12);
    assert_eq!(r.oxygen_factor, 2.0);
    assert_close(r.velocity_factor, 2.0, 1e-12);
    assert_close(r.base_metal_rate, 42.0, 1e-12);
    assert_eq!(r.cladding_rate, Some(2.0));
    assert_eq!(r.unit, "mpy");
}

#[test]
fn sour_water_velocity_bands() {
    assert_eq!(velocity_factor(TemperatureScale::Fahrenheit, 5.9), 1.0);
    assert_eq!(velocity_factor(TemperatureScale::Fahrenheit, 30.0), 5.0);
    assert_eq!(velocity_factor(TemperatureScale::Celsius, 1.0), 1.0);
    assert_close(velocity_factor(TemperatureScale::Celsius, 3.0), 1.96, 1e-12);
    assert_eq!(velocity_factor(TemperatureScale::Celsius, 7.0), 5.0);
}

#[test]
fn hf_carbon_steel_clamps_above_table() {
    let t = table(
        "table_2b62",
        json!({"temperature_in_f": {
            "80": {"1-2": {"<10": 1.0}},
            "120": {"1-2": {"<10": 3.0}}
        }}),
    );
    let inp = HfInput {
        scale: TemperatureScale::Fahrenheit,
        temperature: 200.0,
        material: HfMaterial::CarbonSteel {
            hf_range: "1-2".into(),
            velocity: "<10".into(),
        },
    };
    let r = compute_hf(&inp, &t).unwrap();
    assert_eq!(r.rate, 3.0);
    assert_eq!(r.flag, Some(RangeFlag::ClampedAbove));
    assert_eq!(r.warnings.len(), 1);
}

#[test]
fn hf_alloy_400_reads_aeration_branch() {
    let t = table(
        "table_2b63",
        json!({"temperature_in_f": {
            "100": {"Aerated": {"10": 2.0}, "Non-aerated": {"10": 1.0}},
            "200": {"Aerated": {"10": 4.0}, "Non-aerated": {"10": 1.0}}
        }}),
    );
    let inp = HfInput {
        scale: TemperatureScale::Fahrenheit,
        temperature: 150.0,
        material: HfMaterial::Alloy400 {
            aerated: true,
            hf_concentration: "10".into(),
        },
    };
    assert_close(compute_hf(&inp, &t).unwrap().rate, 3.0, 1e-12);
}

#[test]
fn naphthenic_interpolates_boundary_keys_and_applies_velocity_multiplier() {
    let t = table(
        "table_2b32",
        json!({"temperature_in_f": {"0.2": {"0.3": {"<=450": 1.0, "500": 2.0, ">750": 6.0}}}}),
    );
    let mut inp = NaphthenicInput {
        scale: TemperatureScale::Fahrenheit,
        material: NaphthenicMaterial::CarbonSteel,
        max_process_temp: 475.0,
        sulfur_concentration: 0.20,
        tan: 0.3,
        velocity: 50.0,
    };
    assert_eq!(inp.material.table_name(), "table_2b32");
    assert_close(compute_naphthenic(&inp, &t).unwrap().rate, 1.5, 1e-12);

    inp.velocity = 120.0;
    let r = compute_naphthenic(&inp, &t).unwrap();
    assert_close(r.rate, 7.5, 1e-12);
    assert_eq!(r.warnings.len(), 1);

    inp.tan = 0.7;
    assert!(matches!(compute_naphthenic(&inp, &t), Err(CalcError::Table(_))));
}

#[test]
fn naphthenic_matches_boundary_prefixed_sulfur_and_tan_keys() {
    let t = table(
        "table_2b32",
        json!({"temperature_in_f": {"<=0.2": {">4": {"<=450": 1.0, ">750": 4.0}}}}),
    );
    let inp = NaphthenicInput {
        scale: TemperatureScale::Fahrenheit,
        material: NaphthenicMaterial::CarbonSteel,
        max_process_temp: 600.0,
        sulfur_concentration: 0.2,
        tan: 4.0,
        velocity: 10.0,
    };
    assert_close(compute_naphthenic(&inp, &t).unwrap().rate, 2.5, 1e-12);
}

#[test]
fn sulfuric_carbon_steel_uses_nearest_concentration_row() {
    let t = table(
        "table_2b52",
        json!({
            "2": [
                {"temperature": 100, "acid_velocity": {"2": 5.0}},
                {"temperature": 150, "acid_velocity": {"2": 15.0}}
            ],
            "5": [{"temperature": 100, "acid_velocity": {"2": 50.0}}]
        }),
    );
    let inp = SulfuricInput {
        scale: TemperatureScale::Fahrenheit,
        material: SulfuricMaterial::CarbonSteel,
        acid_concentration: 3.0,
        max_temperature: 125.0,
        velocity: 2.0,
        oxygen_present: false,
        specialist_rate: None,
    };
    assert_eq!(inp.material.table_name(inp.scale), "table_2b52");
    assert_close(compute_sulfuric(&inp, &t).unwrap().rate, 10.0, 1e-12);
}

#[test]
fn sulfuric_alloy_tables_nest_temperature_then_velocity() {
    let t = table(
        "table_2b53",
        json!({"temperature_in_f": {"98": {"100": {"2": 1.0}, "200": {"2": 3.0}}}}),
    );
    let inp = SulfuricInput {
        scale: TemperatureScale::Fahrenheit,
        material: SulfuricMaterial::Ss304,
        acid_concentration: 98.0,
        max_temperature: 150.0,
        velocity: 2.0,
        oxygen_present: true,
        specialist_rate: None,
    };
    assert_close(compute_sulfuric(&inp, &t).unwrap().rate, 2.0, 1e-12);
}

#[test]
fn sulfuric_b2_with_oxygen_needs_specialist_rate() {
    let t = table("table_2b57", json!({}));
    let mut inp = SulfuricInput {
        scale: TemperatureScale::Celsius,
        material: SulfuricMaterial::AlloyB2,
        acid_concentration: 50.0,
        max_temperature: 40.0,
        velocity: 1.0,
        oxygen_present: true,
        specialist_rate: None,
    };
    assert!(matches!(
        compute_sulfuric(&inp, &t),
        Err(CalcError::MissingInput("specialist_rate"))
    ));
    inp.specialist_rate = Some(12.0);
    let r = compute_sulfuric(&inp, &t).unwrap();
    assert_eq!((r.rate, r.unit), (12.0, "mm/y"));
}

#[test]
fn amine_carbon_steel_picks_nearest_temperature_and_band() {
    let rates = table(
        "table_2b82",
        json!({"temperature_in_f": {"0.1": {
            "190": {"0.5": {"<=5": 1.0, ">5": 3.0}},
            "200": {"0.5": {"<=5": 2.0, ">5": 4.0}}
        }}}),
    );
    let multipliers = table(
        "table_2b84",
        json!({"amine_corrosion_rate_multiplier": {"MEA": {"<=20": 1.0, "21_to_25": 1.5, ">25": 2.0}}}),
    );
    let inp = AmineCarbonSteelInput {
        scale: TemperatureScale::Fahrenheit,
        amine: AmineType::Mea,
        acid_gas_loading: "0.1".into(),
        hsas: "0.5".into(),
        amine_concentration: 30.0,
        velocity: 10.0,
        temperature: 195.0,
    };
    let r = compute_amine_carbon_steel(&inp, &rates, &multipliers).unwrap();
    assert_eq!(r.temperature_key, "190");
    assert_eq!(r.velocity_band, ">5");
    assert_eq!((r.base_rate, r.multiplier), (3.0, 2.0));
    assert_eq!(r.rate.rate, 6.0);
    assert_eq!(r.rate.warnings.len(), 1);
}

#[test]
fn amine_velocity_band_prefers_twenty_split() {
    let cols = json!({"<20": 1, ">20": 2, "<=5": 3});
    let map = cols.as_object().unwrap();
    assert_eq!(velocity_band(map, 25.0), Some(">20"));
    assert_eq!(velocity_band(map, 3.0), Some("<20"));
    assert_eq!(AmineType::Dea.concentration_band(35.0), "31_to_40");
    assert_eq!(AmineType::Mdea.concentration_band(45.0), "<=50");
}

#[test]
fn amine_stainless_warns_outside_range() {
    let t = table(
        "table_2b85",
        json!({"data": {"0.1": {"mpy": 1.0, "mm/yr": 0.025}, "0.7": {"mpy": 5.0, "mm/yr": 0.13}}}),
    );
    let inp = AmineStainlessInput {
        scale: TemperatureScale::Fahrenheit,
        acid_gas_loading: 0.6,
        temperature: 200.0,
    };
    let r = compute_amine_stainless(&inp, &t).unwrap();
    assert_eq!(r.rate, 5.0);
    assert!(r.warnings.is_empty());

    let inp = AmineStainlessInput {
        scale: TemperatureScale::Celsius,
        acid_gas_loading: 0.9,
        temperature: 160.0,
    };
    let r = compute_amine_stainless(&inp, &t).unwrap();
    assert_eq!(r.rate, 0.13);
    assert_eq!(r.warnings.len(), 2);
}

fn chloride_ph_table() -> LookupTable {
    table(
        "table_2b22",
        json!({
            "ci_concentration": [[1, 10], [11, 100], [101, 1000], [1001, 12000]],
            "ph": [4.5, 3.5, 2.5, 1.5]
        }),
    )
}

fn hcl_input(material: HclMaterial, temp: f64, ph: Option<f64>, chloride: Option<f64>) -> HclInput {
    HclInput {
        scale: TemperatureScale::Fahrenheit,
        material,
        temperature: temp,
        ph,
        chloride_ppm: chloride,
    }
}

#[test]
fn hcl_converts_between_chloride_and_ph() {
    let t = chloride_ph_table();
    assert_eq!(ph_from_chloride(&t, 50.0).unwrap(), 3.5);
    assert!(matches!(ph_from_chloride(&t, 0.5), Err(CalcError::Undetermined("chloride_ppm"))));
    assert!(matches!(ph_from_chloride(&t, 12_001.0), Err(CalcError::Undetermined("chloride_ppm"))));

    assert_close(chloride_from_ph(&t, 3.5).unwrap(), 55.5, 1e-12);
    // 3.5와 2.5 사이 중간: 55.5와 550.5의 중간
    assert_close(chloride_from_ph(&t, 3.0).unwrap(), 303.0, 1e-9);
    assert!(matches!(chloride_from_ph(&t, 0.4), Err(CalcError::Undetermined("ph"))));

    assert_eq!(alloy_chloride_row(9_000.0), 1.0);
    assert_eq!(alloy_chloride_row(6_000.0), 0.5);
    assert_eq!(alloy_chloride_row(100.0), 0.5);
}

#[test]
fn hcl_carbon_steel_uses_nearest_ph_row() {
    let chloride = chloride_ph_table();
    let rates = table(
        "table_2b23",
        json!({"temperature in f°": {
            "3": {"100": 10.0, "200": 30.0},
            "4": {"100": 1.0, "200": 3.0}
        }}),
    );
    let r = compute_hcl(&hcl_input(HclMaterial::CarbonSteel, 150.0, Some(3.8), None), &chloride, &rates).unwrap();
    assert_close(r.rate, 2.0, 1e-12);
    assert!(r.warnings.is_empty());

    // Cl 500 ppm → pH 2.5 → 가장 가까운 3 행
    let r = compute_hcl(&hcl_input(HclMaterial::Series300, 150.0, None, Some(500.0)), &chloride, &rates).unwrap();
    assert_close(r.rate, 20.0, 1e-12);
    assert_eq!(r.warnings.len(), 1);

    let err = compute_hcl(&hcl_input(HclMaterial::CarbonSteel, 150.0, None, None), &chloride, &rates).unwrap_err();
    assert!(matches!(err, CalcError::MissingInput("ph")));
}

#[test]
fn hcl_alloys_select_rows_by_alloy_and_chloride() {
    let chloride = chloride_ph_table();
    let alloy = HclMaterial::Alloy {
        alloy: "Alloy 20".into(),
    };
    let rates = table(
        "table_2b25",
        json!({"temperature in f°": [
            {"alloy": "Alloy 20", "cl_concentration": 0.5, "temperature": {"100": 2.0, "200": 4.0}},
            {"alloy": "Alloy 20", "cl_concentration": 1.0, "temperature": {"100": 5.0, "200": 9.0}}
        ]}),
    );
    let r = compute_hcl(&hcl_input(alloy.clone(), 100.0, None, Some(9_000.0)), &chloride, &rates).unwrap();
    assert_eq!(r.rate, 5.0);
    assert_eq!(r.warnings.len(), 1);
    let r = compute_hcl(&hcl_input(alloy, 200.0, None, Some(5_000.0)), &chloride, &rates).unwrap();
    assert_eq!(r.rate, 4.0);
    assert!(r.warnings.is_empty());

    let nickel = table(
        "table_2b26",
        json!({"temperature in f°": [
            {"alloy": "Alloy 400", "temperature": {
                "100": {"oxygen": 20.0, "no_oxygen": 2.0},
                "200": {"oxygen": 40.0, "no_oxygen": 4.0}
            }}
        ]}),
    );
    let material = |oxidants_present| HclMaterial::NickelAlloy {
        alloy: "Alloy 400".into(),
        oxidants_present,
    };
    let r = compute_hcl(&hcl_input(material(true), 150.0, None, None), &chloride, &nickel).unwrap();
    assert_close(r.rate, 30.0, 1e-12);
    let r = compute_hcl(&hcl_input(material(false), 150.0, None, None), &chloride, &nickel).unwrap();
    assert_close(r.rate, 3.0, 1e-12);
}

fn alkaline_table() -> LookupTable {
    table(
        "table_2b72",
        json!({"temperature_in_f": {
            "2": {"10": 3.0, "20": 6.0},
            "5": {"10": 6.0, "20": 20.0}
        }}),
    )
}

#[test]
fn alkaline_sour_water_adjusts_for_h2s_pressure() {
    let f = TemperatureScale::Fahrenheit;
    assert_eq!(pressure_adjusted_rate(6.0, 50.0, f), 6.0);
    assert_eq!(pressure_adjusted_rate(6.0, 100.0, f), 13.5);
    assert_eq!(pressure_adjusted_rate(6.0, 75.0, f), 9.75);
    assert_eq!(pressure_adjusted_rate(6.0, 25.0, f), 0.0);
    assert_eq!(pressure_adjusted_rate(6.0, 0.0, f), 0.0);
    assert_eq!(pressure_adjusted_rate(1.0, 621.0, TemperatureScale::Celsius), 2.0);

    let t = alkaline_table();
    let input = |p| AlkalineSourWaterInput {
        scale: f,
        nh4hs_wt_pct: 2.0,
        velocity: 20.0,
        h2s_partial_pressure: p,
    };
    let r = compute_alkaline_sour_water(&input(Some(100.0)), &t).unwrap();
    assert_eq!(r.baseline_rate, 6.0);
    assert_eq!(r.rate, 13.5);
    assert!(r.warnings.is_empty());

    let r = compute_alkaline_sour_water(&input(None), &t).unwrap();
    assert_eq!(r.rate, 6.0);
    assert_eq!(r.warnings.len(), 1);

    let off_grid = AlkalineSourWaterInput {
        nh4hs_wt_pct: 3.0,
        ..input(None)
    };
    assert!(matches!(compute_alkaline_sour_water(&off_grid, &t), Err(CalcError::Table(_))));
}

fn h2s_h2_table() -> LookupTable {
    table(
        "table_2b42",
        json!({"temperature_in_f": {
            "temperatures": [425, 475, 525],
            "data": {
                "0.1": [1.0, 2.0, 4.0],
                "1": {"Naphtha": [2.0, 4.0, 8.0], "Gas oil": [1.0, 3.0, 5.0]}
            }
        }}),
    )
}

#[test]
fn ht_h2s_h2_reads_parallel_arrays_and_hydrocarbon_split() {
    let t = h2s_h2_table();
    let input = |h2s, temp, hydrocarbon| H2sH2Input {
        scale: TemperatureScale::Fahrenheit,
        material: H2sH2Material::LowAlloy,
        max_temperature: temp,
        h2s_mol_pct: h2s,
        hydrocarbon,
    };
    assert_close(compute_h2s_h2(&input(0.1, 500.0, None), &t).unwrap().rate, 3.0, 1e-12);
    assert_close(
        compute_h2s_h2(&input(1.0, 450.0, Some(Hydrocarbon::GasOil)), &t).unwrap().rate,
        2.0,
        1e-12,
    );
    assert!(matches!(
        compute_h2s_h2(&input(1.0, 450.0, None), &t),
        Err(CalcError::MissingInput("hydrocarbon"))
    ));

    let hot = compute_h2s_h2(&input(0.1, 600.0, None), &t).unwrap();
    assert_eq!(hot.rate, 4.0);
    assert_eq!(hot.flag, Some(RangeFlag::ClampedAbove));
    assert_eq!(hot.warnings.len(), 1);
    assert_eq!(H2sH2Material::Cr9Mo.table_name(), "table_2b45");
}

#[test]
fn ht_oxidation_skips_empty_cells() {
    let t = table(
        "table_2b92",
        json!({"temperature_in_f": {
            "CS": {"900": 2.0, "1000": 4.0, "1100": null},
            "304 SS": {"1000": null, "1100": 1.0, "1200": 3.0}
        }}),
    );
    let input = |material, temp| HtOxidationInput {
        scale: TemperatureScale::Fahrenheit,
        material,
        max_temperature: temp,
    };
    assert_close(
        compute_ht_oxidation(&input(OxidationMaterial::CarbonSteel, 950.0), &t).unwrap().rate,
        3.0,
        1e-12,
    );
    let r = compute_ht_oxidation(&input(OxidationMaterial::CarbonSteel, 1100.0), &t).unwrap();
    assert_eq!(r.rate, 4.0);
    assert_eq!(r.flag, Some(RangeFlag::ClampedAbove));
    assert_close(
        compute_ht_oxidation(&input(OxidationMaterial::Ss304, 1150.0), &t).unwrap().rate,
        2.0,
        1e-12,
    );
}

struct SoilTables {
    base: LookupTable,
    resistivity: LookupTable,
    temperature: LookupTable,
    cp: LookupTable,
    coating: LookupTable,
}

impl SoilTables {
    fn new() -> Self {
        Self {
            base: table(
                "table_2b122",
                json!({"data": [
                    {"soilType": "Sand", "rate": {"mpy": 1.0, "mmPerYear": 0.03}},
                    {"soilType": "Clay", "rate": {"mpy": 3.0, "mmPerYear": 0.08}}
                ]}),
            ),
            resistivity: table(
                "table_2b123",
                json!({"data": [
                    {"resistivity": {"range": "<500"}, "multiplyingFactor": 1.5, "corrosiveness": "Very corrosive"},
                    {"resistivity": {"range": "500 to 10,000"}, "multiplyingFactor": 1.0, "corrosiveness": "Moderately corrosive"},
                    {"resistivity": {"range": ">10,000"}, "multiplyingFactor": 0.5, "corrosiveness": "Mildly corrosive"}
                ]}),
            ),
            temperature: table(
                "table_2b124",
                json!({"data": [
                    {"temperature": {"fahrenheit": "<120", "celsius": "<49"}, "multiplyingFactor": 1.0},
                    {"temperature": {"fahrenheit": "120 to 220", "celsius": "49 to 104"}, "multiplyingFactor": 2.0},
                    {"temperature": {"fahrenheit": ">220", "celsius": ">104"}, "multiplyingFactor": 1.0}
                ]}),
            ),
            cp: table(
                "table_2b125",
                json!({"data": [
                    {"practice": "No cathodic protection", "multiplyingFactor": 1.0},
                    {"practice": "Effective cathodic protection", "multiplyingFactor": 0.05}
                ]}),
            ),
            coating: table(
                "table_2b126",
                json!({"data": [
                    {"coatingType": "FBE", "baseFactorForCoatingType": 0.1, "multiplyingFactors": {
                        "ageOver20Years": 2.0,
                        "maxRatedTemperatureOccasionallyExceeded": 3.0,
                        "coatingMaintenanceRareOrNone": 1.5
                    }}
                ]}),
            ),
        }
    }

    fn bundle(&self) -> SoilSideTables<'_> {
        SoilSideTables {
            base_rates: &self.base,
            resistivity: &self.resistivity,
            temperature: &self.temperature,
            cathodic_protection: &self.cp,
            coating: &self.coating,
        }
    }
}

#[test]
fn soil_side_multiplies_every_factor() {
    let tables = SoilTables::new();
    let input = SoilSideInput {
        scale: TemperatureScale::Fahrenheit,
        soil_type: "Clay".into(),
        resistivity_ohm_cm: Some(300.0),
        operating_temperature: 120.0,
        cathodic_protection: "No cathodic protection".into(),
        coating: Some(CoatingCondition {
            coating_type: "FBE".into(),
            age_over_20_years: true,
            max_rated_temperature_exceeded: false,
            maintenance_rare_or_none: true,
        }),
    };
    let r = compute_soil_side(&input, tables.bundle()).unwrap();
    assert_eq!(r.base_rate, 3.0);
    assert_eq!(r.resistivity_factor, 1.5);
    assert_eq!(r.corrosiveness.as_deref(), Some("Very corrosive"));
    assert_eq!(r.temperature_factor, 2.0);
    assert_close(r.coating_factor, 0.3, 1e-12);
    assert_close(r.rate, 2.7, 1e-9);
    assert!(r.warnings.is_empty());
}

#[test]
fn soil_side_defaults_without_resistivity_or_coating() {
    let tables = SoilTables::new();
    let input = SoilSideInput {
        scale: TemperatureScale::Fahrenheit,
        soil_type: "Sand".into(),
        resistivity_ohm_cm: None,
        operating_temperature: 100.0,
        cathodic_protection: "Effective cathodic protection".into(),
        coating: None,
    };
    let r = compute_soil_side(&input, tables.bundle()).unwrap();
    assert_eq!(r.resistivity_factor, 1.0);
    assert_eq!(r.coating_factor, 1.0);
    assert_close(r.rate, 0.05, 1e-12);
    assert_eq!(r.warnings.len(), 1);

    let unknown = SoilSideInput {
        soil_type: "Peat".into(),
        ..input
    };
    assert!(matches!(compute_soil_side(&unknown, tables.bundle()), Err(CalcError::Table(_))));
}

#[test]
fn coating_factor_rounds_to_two_decimals() {
    let tables = SoilTables::new();
    let coating = CoatingCondition {
        coating_type: "FBE".into(),
        age_over_20_years: false,
        max_rated_temperature_exceeded: true,
        maintenance_rare_or_none: true,
    };
    assert_close(coating_factor(&tables.coating, &coating).unwrap(), 0.45, 1e-12);
    let bare = CoatingCondition {
        coating_type: "FBE".into(),
        ..CoatingCondition::default()
    };
    assert_eq!(coating_factor(&tables.coating, &bare).unwrap(), 0.1);
}
