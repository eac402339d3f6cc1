use crate::state::Warning;
use configuration::{SimulatorConfig, SliderConfig};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Slider positions of the scenario simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorInputs {
    /// FX rate, R$/US$.
    pub fx: Decimal,
    /// Oil price, US$/barrel.
    pub oil: Decimal,
    /// Soy futures, US$/bushel.
    pub soy: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// The inputs actually used, after fitting them to the sliders.
    pub inputs: SimulatorInputs,
    pub estimated_price: Decimal,
}

/// Slider bounds offered to a UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderOptions {
    pub fx: SliderConfig,
    pub oil: SliderConfig,
    pub soy: SliderConfig,
}

/// Linear what-if model of the FOB price.
#[derive(Debug, Clone)]
pub struct PricingSimulator {
    config: SimulatorConfig,
}

impl PricingSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// The slider starting positions.
    pub fn default_inputs(&self) -> SimulatorInputs {
        SimulatorInputs {
            fx: self.config.fx.default,
            oil: self.config.oil.default,
            soy: self.config.soy.default,
        }
    }

    pub fn sliders(&self) -> SliderOptions {
        SliderOptions {
            fx: self.config.fx,
            oil: self.config.oil,
            soy: self.config.soy,
        }
    }

    /// `base + coef_fx·(fx − fx_ref) + coef_oil·(oil − oil_ref) + coef_soy·(soy − soy_ref)`
    pub fn price(&self, inputs: &SimulatorInputs) -> Decimal {
        let c = &self.config;
        c.base
            + c.coef_fx * (inputs.fx - c.fx_ref)
            + c.coef_oil * (inputs.oil - c.oil_ref)
            + c.coef_soy * (inputs.soy - c.soy_ref)
    }

    /// Moves each input to the nearest slider position, then prices the scenario.
    pub fn estimate(&self, requested: &SimulatorInputs) -> (SimulationResult, Vec<Warning>) {
        let mut warnings = Vec::new();
        let inputs = SimulatorInputs {
            fx: fit("FX", requested.fx, &self.config.fx, &mut warnings),
            oil: fit("oil", requested.oil, &self.config.oil, &mut warnings),
            soy: fit("soy", requested.soy, &self.config.soy, &mut warnings),
        };
        let estimated_price = self.price(&inputs);
        (
            SimulationResult {
                inputs,
                estimated_price,
            },
            warnings,
        )
    }
}

/// Clamps `value` to the slider bounds and rounds it to the nearest step
/// counted from `min`, halves away from zero. A non-positive step only clamps.
fn fit(name: &str, value: Decimal, slider: &SliderConfig, warnings: &mut Vec<Warning>) -> Decimal {
    let clamped = value.clamp(slider.min, slider.max);
    let used = match (clamped - slider.min).checked_div(slider.step) {
        Some(steps) if slider.step > Decimal::ZERO => {
            let steps = steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            (slider.min + steps * slider.step).min(slider.max)
        }
        _ => clamped,
    }
    .normalize();
    if used != value {
        warnings.push(Warning::SimulatorInputClamped {
            input: name.to_string(),
            requested: value.to_string(),
            used: used.to_string(),
        });
    }
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_sliders_price_exactly() {
        let sim = PricingSimulator::new(SimulatorConfig::default());
        let inputs = sim.default_inputs();
        assert_eq!(inputs, SimulatorInputs { fx: dec!(5.2), oil: dec!(85.0), soy: dec!(14.5) });
        // 450 + 20·0.2 + 0.8·5 + 2.5·0.5
        let (result, warnings) = sim.estimate(&inputs);
        assert_eq!(result.estimated_price, dec!(459.25));
        assert!(warnings.is_empty());
    }

    #[test]
    fn reference_point_prices_at_base() {
        let sim = PricingSimulator::new(SimulatorConfig::default());
        let at_ref = SimulatorInputs { fx: dec!(5.0), oil: dec!(80), soy: dec!(14.0) };
        assert_eq!(sim.price(&at_ref), dec!(450));
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let sim = PricingSimulator::new(SimulatorConfig::default());
        let (result, warnings) = sim.estimate(&SimulatorInputs {
            fx: dec!(9.5),
            oil: dec!(85),
            soy: dec!(5),
        });
        assert_eq!(result.inputs.fx, dec!(7.0));
        assert_eq!(result.inputs.soy, dec!(10.0));
        assert_eq!(warnings.len(), 2);
        // 450 + 20·2 + 0.8·5 + 2.5·(−4)
        assert_eq!(result.estimated_price, dec!(484));
    }

    #[test]
    fn off_step_inputs_snap_to_the_nearest_position() {
        let sim = PricingSimulator::new(SimulatorConfig::default());
        let (result, warnings) = sim.estimate(&SimulatorInputs {
            fx: dec!(5.26),
            oil: dec!(84.5),
            soy: dec!(14.5),
        });
        assert_eq!(result.inputs.fx, dec!(5.3));
        assert_eq!(result.inputs.oil, dec!(85));
        assert_eq!(result.inputs.soy, dec!(14.5));
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[0],
            Warning::SimulatorInputClamped {
                input: "FX".to_string(),
                requested: "5.26".to_string(),
                used: "5.3".to_string(),
            }
        );
        // 450 + 20·0.3 + 0.8·5 + 2.5·0.5
        assert_eq!(result.estimated_price, dec!(461.25));
    }

    #[test]
    fn snapping_never_leaves_the_bounds() {
        let slider = SliderConfig::new(dec!(0), dec!(1), dec!(0.3), dec!(0));
        let mut warnings = Vec::new();
        assert_eq!(fit("x", dec!(0.95), &slider, &mut warnings), dec!(0.9));
        assert_eq!(fit("x", dec!(1), &slider, &mut warnings), dec!(0.9));
        assert_eq!(fit("x", dec!(0.6), &slider, &mut warnings), dec!(0.6));
        assert_eq!(warnings.len(), 2);
    }
}
