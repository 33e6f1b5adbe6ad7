mod flat_ribbon;
mod locator_scenarios;
mod tilted_ribbon;
