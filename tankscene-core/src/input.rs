/// Keyboard actions and key bindings
///
/// Frontends translate their native key events into [`Key`]s; the keymap turns
/// those into [`Action`]s, which are the only thing the application state
/// understands.
use std::collections::HashMap;

use crate::camera::Preset;
use crate::error::{Error, Result};

/// A platform-neutral key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Parse a key name: a single character or `space`/`up`/`down`/`left`/`right`
    pub fn from_name(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c.to_ascii_lowercase()));
        }
        match name.to_ascii_lowercase().as_str() {
            "space" => Ok(Key::Space),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            _ => Err(Error::UnknownKey(name.to_string())),
        }
    }

    /// Key as reported by a browser `KeyboardEvent.key`
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            " " => Some(Key::Space),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            other => Key::from_name(other).ok().filter(|k| matches!(k, Key::Char(_))),
        }
    }
}

/// Everything the keyboard can ask the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Camera(Preset),
    ToggleSplit,
    ToggleOblique,
    TogglePerspective,
    TiltUp,
    TiltDown,
    TiltLeft,
    TiltRight,
    DriveBack,
    DriveForward,
    BarrelUp,
    BarrelDown,
    TurretLeft,
    TurretRight,
    ClawOpen,
    ClawClose,
    CycleWireframe,
    ZoomIn,
    ZoomOut,
    Reset,
    Fire,
}

const ACTION_NAMES: &[(&str, Action)] = &[
    ("camera-left", Action::Camera(Preset::Left)),
    ("camera-front", Action::Camera(Preset::Front)),
    ("camera-top", Action::Camera(Preset::Top)),
    ("camera-free", Action::Camera(Preset::Free)),
    ("split-view", Action::ToggleSplit),
    ("oblique", Action::ToggleOblique),
    ("perspective", Action::TogglePerspective),
    ("tilt-up", Action::TiltUp),
    ("tilt-down", Action::TiltDown),
    ("tilt-left", Action::TiltLeft),
    ("tilt-right", Action::TiltRight),
    ("drive-back", Action::DriveBack),
    ("drive-forward", Action::DriveForward),
    ("barrel-up", Action::BarrelUp),
    ("barrel-down", Action::BarrelDown),
    ("turret-left", Action::TurretLeft),
    ("turret-right", Action::TurretRight),
    ("claw-open", Action::ClawOpen),
    ("claw-close", Action::ClawClose),
    ("wireframe", Action::CycleWireframe),
    ("zoom-in", Action::ZoomIn),
    ("zoom-out", Action::ZoomOut),
    ("reset", Action::Reset),
    ("fire", Action::Fire),
];

impl Action {
    pub fn from_name(name: &str) -> Result<Self> {
        ACTION_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| *a)
            .ok_or_else(|| Error::UnknownAction(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        ACTION_NAMES
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(n, _)| *n)
            .unwrap_or("unbound")
    }
}

/// Key to action table
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap {
    bindings: HashMap<Key, Action>,
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: Key, action: Action) -> Option<Action> {
        self.bindings.insert(key, action)
    }

    pub fn lookup(&self, key: Key) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Apply the bindings of a keymap file on top of this one
    pub fn overlay(&mut self, text: &str) -> Result<usize> {
        let parsed = crate::keymap::parse_keymap(text)?;
        let count = parsed.len();
        for (key, action) in parsed {
            self.bind(key, action);
        }
        Ok(count)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let mut map = Self::empty();
        let defaults = [
            (Key::Char('1'), Action::Camera(Preset::Left)),
            (Key::Char('2'), Action::Camera(Preset::Front)),
            (Key::Char('3'), Action::Camera(Preset::Top)),
            (Key::Char('4'), Action::Camera(Preset::Free)),
            (Key::Char('0'), Action::ToggleSplit),
            (Key::Char('8'), Action::ToggleOblique),
            (Key::Char('9'), Action::TogglePerspective),
            (Key::Up, Action::TiltUp),
            (Key::Down, Action::TiltDown),
            (Key::Left, Action::TiltLeft),
            (Key::Right, Action::TiltRight),
            (Key::Char('q'), Action::DriveBack),
            (Key::Char('e'), Action::DriveForward),
            (Key::Char('w'), Action::BarrelUp),
            (Key::Char('s'), Action::BarrelDown),
            (Key::Char('a'), Action::TurretLeft),
            (Key::Char('d'), Action::TurretRight),
            (Key::Char('o'), Action::ClawOpen),
            (Key::Char('p'), Action::ClawClose),
            (Key::Space, Action::CycleWireframe),
            (Key::Char('+'), Action::ZoomIn),
            (Key::Char('-'), Action::ZoomOut),
            (Key::Char('r'), Action::Reset),
            (Key::Char('z'), Action::Fire),
        ];
        for (key, action) in defaults {
            map.bind(key, action);
        }
        map
    }
}
