use crate::Led;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Output state of a GPIO port, shared so the LED can be observed after the
/// port has been handed to the harness.
#[derive(Debug, Default)]
pub struct GpioState {
    pub odr: AtomicU32,
    pub toggles: AtomicU64,
}

/// LED on one pin of a GPIO port, driven through the bit set/reset register.
#[derive(Debug, Clone)]
pub struct GpioLed {
    pin: u8,
    pub state: Arc<GpioState>,
}

impl GpioLed {
    pub fn new(pin: u8) -> Self {
        Self::with_state(pin, Arc::new(GpioState::default()))
    }

    pub fn with_state(pin: u8, state: Arc<GpioState>) -> Self {
        Self {
            pin: pin % 16,
            state,
        }
    }

    /// BSRR: low halfword sets bits, high halfword resets them.
    fn write_bsrr(&self, value: u32) {
        let set = value & 0xFFFF;
        let reset = (value >> 16) & 0xFFFF;
        let _ = self
            .state
            .odr
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |odr| {
                Some((odr | set) & !reset)
            });
    }

    pub fn is_on(&self) -> bool {
        (self.state.odr.load(Ordering::SeqCst) & (1 << self.pin)) != 0
    }

    pub fn toggles(&self) -> u64 {
        self.state.toggles.load(Ordering::SeqCst)
    }
}

impl Led for GpioLed {
    fn toggle(&mut self) {
        let mask = 1u32 << self.pin;
        if self.is_on() {
            self.write_bsrr(mask << 16);
        } else {
            self.write_bsrr(mask);
        }
        self.state.toggles.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("LED{} {}", self.pin, if self.is_on() { "on" } else { "off" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_only_its_pin() {
        let state = Arc::new(GpioState::default());
        state.odr.store(0x0001, Ordering::SeqCst);
        let mut led = GpioLed::with_state(5, state.clone());

        led.toggle();
        assert!(led.is_on());
        assert_eq!(state.odr.load(Ordering::SeqCst), 0x0021);

        led.toggle();
        assert!(!led.is_on());
        assert_eq!(state.odr.load(Ordering::SeqCst), 0x0001);
        assert_eq!(led.toggles(), 2);
    }

    #[test]
    fn test_clones_observe_same_port() {
        let mut led = GpioLed::new(0);
        let probe = led.clone();
        led.toggle();
        assert!(probe.is_on());
        assert_eq!(probe.toggles(), 1);
    }
}
