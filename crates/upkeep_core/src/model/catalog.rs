use crate::model::{Cadence, Task};

const ENTRIES: &[(&str, &str, &str, Cadence)] = &[
    (
        "hvac-filter",
        "Replace HVAC filter",
        "Swap the furnace/AC return filter; write the size on the frame.",
        Cadence::Monthly,
    ),
    (
        "smoke-detectors",
        "Test smoke and CO detectors",
        "Press the test button on every unit and replace weak batteries.",
        Cadence::Monthly,
    ),
    (
        "garbage-disposal",
        "Clean garbage disposal",
        "Grind ice and citrus peel, then flush with cold water.",
        Cadence::Monthly,
    ),
    (
        "range-hood-filter",
        "Clean range hood filter",
        "Soak the grease filter in hot water with degreaser.",
        Cadence::Quarterly,
    ),
    (
        "water-softener",
        "Check water softener salt",
        "Top up salt and break up any bridging in the brine tank.",
        Cadence::Quarterly,
    ),
    (
        "gfci-outlets",
        "Test GFCI outlets",
        "Trip and reset each GFCI outlet in kitchens, baths and outside.",
        Cadence::Quarterly,
    ),
    (
        "exterior-walkaround",
        "Exterior walk-around",
        "Look for siding damage, pest entry points and drainage problems.",
        Cadence::Seasonal,
    ),
    (
        "water-heater-flush",
        "Flush water heater",
        "Drain a few gallons from the tank to clear sediment.",
        Cadence::Annual,
    ),
    (
        "dryer-vent",
        "Clean dryer vent duct",
        "Disconnect the duct and clear lint all the way to the exterior hood.",
        Cadence::Annual,
    ),
    (
        "ac-service",
        "Service air conditioner",
        "Clear debris around the condenser and book a tune-up.",
        Cadence::Spring,
    ),
    (
        "window-screens",
        "Inspect window screens",
        "Patch tears and re-seat screens before bug season.",
        Cadence::Spring,
    ),
    (
        "deck-inspection",
        "Inspect deck and patio",
        "Check for loose boards, popped nails and rot.",
        Cadence::Summer,
    ),
    (
        "gutters",
        "Clean gutters",
        "Clear leaves and confirm downspouts drain away from the foundation.",
        Cadence::Fall,
    ),
    (
        "furnace-service",
        "Service furnace",
        "Book a heating inspection before the first cold snap.",
        Cadence::Fall,
    ),
    (
        "pipe-insulation",
        "Insulate exposed pipes",
        "Wrap pipes in unheated spaces and shut off exterior spigots.",
        Cadence::Winter,
    ),
];

/// The built-in checklist. Ids are stable so stored progress keeps matching
/// across restarts.
pub fn catalog() -> Vec<Task> {
    ENTRIES
        .iter()
        .map(|(id, title, detail, schedule)| Task::new(id, title, detail, *schedule))
        .collect()
}
