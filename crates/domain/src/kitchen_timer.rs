//! Kitchen timer vocabulary: countdowns unrelated to cook cycles.

use crate::code::wire_codes;

wire_codes! {
    /// State reported by `KitchenTimer<NN>_StatusState`.
    pub enum KitchenTimerState: "kitchen timer state" {
        Standby => "0",
        Running => "1",
        Completed => "3",
    }
}

wire_codes! {
    /// Verb written to `KitchenTimer<NN>_SetOperations`.
    pub enum KitchenTimerOperation: "kitchen timer operation" {
        Cancel => "1",
        Start => "2",
    }
}
