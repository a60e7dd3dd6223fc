use std::{cell::Cell, rc::Rc};

use tracing::debug;

use crate::{
    bus::{Event, EventBus, EventKind},
    observable::ObservableValue,
    settings::DarkMode,
    subscription::{OwnerId, Subscription},
};

/// Appearance a screen should force, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceStyle {
    /// Let the system decide.
    #[default]
    Unspecified,
    Light,
    Dark,
}

impl InterfaceStyle {
    /// Style of the home screen, which follows daylight in [`DarkMode::Auto`].
    pub fn home(dark_mode: DarkMode, daylight: bool) -> Self {
        match dark_mode {
            DarkMode::System => InterfaceStyle::Unspecified,
            DarkMode::Light => InterfaceStyle::Light,
            DarkMode::Dark => InterfaceStyle::Dark,
            DarkMode::Auto if daylight => InterfaceStyle::Light,
            DarkMode::Auto => InterfaceStyle::Dark,
        }
    }

    /// Style of every other screen; auto mode defers to the system there.
    pub fn global(dark_mode: DarkMode) -> Self {
        match dark_mode {
            DarkMode::Light => InterfaceStyle::Light,
            DarkMode::Dark => InterfaceStyle::Dark,
            DarkMode::System | DarkMode::Auto => InterfaceStyle::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceStyle::Unspecified => "system",
            InterfaceStyle::Light => "light",
            InterfaceStyle::Dark => "dark",
        }
    }
}

/// Observable appearance state shared by all screens.
#[derive(Debug, Clone)]
pub struct ThemeState {
    daylight: ObservableValue<bool>,
    home_style: ObservableValue<InterfaceStyle>,
    global_style: ObservableValue<InterfaceStyle>,
    dark_mode: Rc<Cell<DarkMode>>,
}

impl ThemeState {
    pub fn new(dark_mode: DarkMode, daylight: bool) -> Self {
        Self {
            daylight: ObservableValue::new(daylight),
            home_style: ObservableValue::new(InterfaceStyle::home(dark_mode, daylight)),
            global_style: ObservableValue::new(InterfaceStyle::global(dark_mode)),
            dark_mode: Rc::new(Cell::new(dark_mode)),
        }
    }

    pub fn daylight(&self) -> &ObservableValue<bool> {
        &self.daylight
    }

    pub fn home_style(&self) -> &ObservableValue<InterfaceStyle> {
        &self.home_style
    }

    pub fn global_style(&self) -> &ObservableValue<InterfaceStyle> {
        &self.global_style
    }

    pub fn dark_mode(&self) -> DarkMode {
        self.dark_mode.get()
    }

    /// Apply whichever inputs changed and recompute both styles. Observers only
    /// hear about values that actually changed.
    pub fn update(&self, dark_mode: Option<DarkMode>, daylight: Option<bool>) {
        if let Some(daylight) = daylight {
            self.daylight.set(daylight);
        }
        if let Some(mode) = dark_mode {
            self.dark_mode.set(mode);
        }

        let mode = self.dark_mode.get();
        let daylight = self.daylight.get();
        debug!(%mode, daylight, "recomputing interface style");

        self.home_style.set(InterfaceStyle::home(mode, daylight));
        self.global_style.set(InterfaceStyle::global(mode));
    }

    /// Follow `DarkModeChanged` events on `bus` until the handle is dropped.
    pub fn bind(&self, bus: &EventBus, owner: OwnerId) -> Subscription {
        let theme = self.clone();
        bus.subscribe(owner, EventKind::DarkModeChanged, move |event| {
            if let Event::DarkModeChanged(mode) = event {
                theme.update(Some(*mode), None);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn style_table() {
        assert_eq!(InterfaceStyle::home(DarkMode::Auto, true), InterfaceStyle::Light);
        assert_eq!(InterfaceStyle::home(DarkMode::Auto, false), InterfaceStyle::Dark);
        assert_eq!(InterfaceStyle::home(DarkMode::System, false), InterfaceStyle::Unspecified);
        assert_eq!(InterfaceStyle::global(DarkMode::Auto), InterfaceStyle::Unspecified);
        assert_eq!(InterfaceStyle::global(DarkMode::Dark), InterfaceStyle::Dark);
    }

    #[test]
    fn nightfall_flips_home_style_only() {
        let theme = ThemeState::new(DarkMode::Auto, true);
        let home = Rc::new(RefCell::new(Vec::new()));
        let global = Rc::new(Cell::new(0));

        let sink = home.clone();
        let _h = theme.home_style().subscribe(OwnerId::new(), false, move |s| sink.borrow_mut().push(*s));
        let count = global.clone();
        let _g = theme.global_style().subscribe(OwnerId::new(), false, move |_| count.set(count.get() + 1));

        theme.update(None, Some(false));

        assert_eq!(*home.borrow(), vec![InterfaceStyle::Dark]);
        assert_eq!(global.get(), 0);
    }

    #[test]
    fn bound_theme_follows_dark_mode_events() {
        let bus = EventBus::new();
        let theme = ThemeState::new(DarkMode::Auto, true);
        let _binding = theme.bind(&bus, OwnerId::new());

        bus.publish(Event::DarkModeChanged(DarkMode::Dark));

        assert_eq!(theme.dark_mode(), DarkMode::Dark);
        assert_eq!(theme.home_style().get(), InterfaceStyle::Dark);
        assert_eq!(theme.global_style().get(), InterfaceStyle::Dark);
    }

    #[test]
    fn dropping_binding_stops_following() {
        let bus = EventBus::new();
        let theme = ThemeState::new(DarkMode::Light, true);
        drop(theme.bind(&bus, OwnerId::new()));

        bus.publish(Event::DarkModeChanged(DarkMode::Dark));

        assert_eq!(theme.home_style().get(), InterfaceStyle::Light);
    }
}
