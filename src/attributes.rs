//! Fixed attributes of the numbers 1..=49.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::zodiac::{Zodiac, ZodiacTable};

pub const MAX_NUMBER: u8 = 49;
pub const ZONE_SIZE: u8 = 7;
pub const ZONE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wave {
    Red,
    Blue,
    Green,
}

impl Wave {
    pub const ALL: [Wave; 3] = [Wave::Red, Wave::Blue, Wave::Green];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Wave::Red => "red",
            Wave::Blue => "blue",
            Wave::Green => "green",
        })
    }
}

/// Five-element (wuxing) class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Metal,
    Wood,
    Water,
    Fire,
    Earth,
}

/// How one element relates to another in the generation and destruction cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRelation {
    Same,
    Generates,
    GeneratedBy,
    Overcomes,
    OvercomeBy,
}

impl ElementRelation {
    pub const ALL: [ElementRelation; 5] = [
        ElementRelation::Same,
        ElementRelation::Generates,
        ElementRelation::GeneratedBy,
        ElementRelation::Overcomes,
        ElementRelation::OvercomeBy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Metal,
        Element::Wood,
        Element::Water,
        Element::Fire,
        Element::Earth,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Wood feeds fire, fire makes earth, earth bears metal, metal carries water, water nourishes wood.
    pub fn generates(self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    pub fn overcomes(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Earth => Element::Water,
            Element::Water => Element::Fire,
            Element::Fire => Element::Metal,
            Element::Metal => Element::Wood,
        }
    }

    pub fn relation_to(self, other: Element) -> ElementRelation {
        if self == other {
            ElementRelation::Same
        } else if self.generates() == other {
            ElementRelation::Generates
        } else if other.generates() == self {
            ElementRelation::GeneratedBy
        } else if self.overcomes() == other {
            ElementRelation::Overcomes
        } else {
            ElementRelation::OvercomeBy
        }
    }
}

const RED: [u8; 17] = [1, 2, 7, 8, 12, 13, 18, 19, 23, 24, 29, 30, 34, 35, 40, 45, 46];
const BLUE: [u8; 16] = [3, 4, 9, 10, 14, 15, 20, 25, 26, 31, 36, 37, 41, 42, 47, 48];

const METAL: [u8; 10] = [4, 5, 12, 13, 26, 27, 34, 35, 42, 43];
const WOOD: [u8; 10] = [8, 9, 16, 17, 24, 25, 38, 39, 46, 47];
const WATER: [u8; 9] = [1, 14, 15, 22, 23, 30, 31, 44, 45];
const FIRE: [u8; 12] = [2, 3, 10, 11, 18, 19, 32, 33, 40, 41, 48, 49];

static WAVES: Lazy<[Wave; 50]> = Lazy::new(|| {
    let mut waves = [Wave::Green; 50];
    for &n in &RED {
        waves[n as usize] = Wave::Red;
    }
    for &n in &BLUE {
        waves[n as usize] = Wave::Blue;
    }
    waves
});

static ELEMENTS: Lazy<[Element; 50]> = Lazy::new(|| {
    let mut elements = [Element::Earth; 50];
    for (group, element) in [
        (&METAL[..], Element::Metal),
        (&WOOD[..], Element::Wood),
        (&WATER[..], Element::Water),
        (&FIRE[..], Element::Fire),
    ] {
        for &n in group {
            elements[n as usize] = element;
        }
    }
    elements
});

pub fn wave_of(number: u8) -> Wave {
    WAVES[number.min(MAX_NUMBER) as usize]
}

pub fn element_of(number: u8) -> Element {
    ELEMENTS[number.min(MAX_NUMBER) as usize]
}

pub fn is_prime(number: u8) -> bool {
    let n = number as u16;
    n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

pub fn head_of(number: u8) -> u8 {
    number / 10
}

pub fn tail_of(number: u8) -> u8 {
    number % 10
}

pub fn zone_of(number: u8) -> usize {
    ((number.max(1) - 1) / ZONE_SIZE) as usize
}

pub fn is_big(number: u8) -> bool {
    number >= 25
}

pub fn is_odd(number: u8) -> bool {
    number % 2 == 1
}

/// Digit root in 1..=9.
pub fn digit_root(value: u32) -> u8 {
    if value == 0 { 0 } else { (1 + (value - 1) % 9) as u8 }
}

/// Every static attribute of one number under a given zodiac table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberProfile {
    pub number: u8,
    pub zodiac: Zodiac,
    pub wave: Wave,
    pub element: Element,
    pub head: u8,
    pub tail: u8,
    pub odd: bool,
    pub big: bool,
    pub prime: bool,
}

impl NumberProfile {
    pub fn new(number: u8, table: &ZodiacTable) -> Self {
        Self {
            number,
            zodiac: table.zodiac_of(number),
            wave: wave_of(number),
            element: element_of(number),
            head: head_of(number),
            tail: tail_of(number),
            odd: is_odd(number),
            big: is_big(number),
            prime: is_prime(number),
        }
    }

    /// Number of attributes (zodiac, wave, element, head, tail, parity, size) shared with `other`.
    pub fn shared_attributes(&self, other: &NumberProfile) -> usize {
        [
            self.zodiac == other.zodiac,
            self.wave == other.wave,
            self.element == other.element,
            self.head == other.head,
            self.tail == other.tail,
            self.odd == other.odd,
            self.big == other.big,
        ]
        .iter()
        .filter(|&&shared| shared)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_partition() {
        let counts = Wave::ALL.map(|w| (1..=49).filter(|&n| wave_of(n) == w).count());
        assert_eq!(counts, [17, 16, 16]);
        assert_eq!(wave_of(1), Wave::Red);
        assert_eq!(wave_of(3), Wave::Blue);
        assert_eq!(wave_of(5), Wave::Green);
        assert_eq!(wave_of(49), Wave::Green);
    }

    #[test]
    fn test_element_partition() {
        let counts = Element::ALL.map(|e| (1..=49).filter(|&n| element_of(n) == e).count());
        assert_eq!(counts, [10, 10, 9, 12, 8]);
        assert_eq!(element_of(6), Element::Earth);
    }

    #[test]
    fn test_element_relations() {
        assert_eq!(Element::Wood.relation_to(Element::Fire), ElementRelation::Generates);
        assert_eq!(Element::Fire.relation_to(Element::Wood), ElementRelation::GeneratedBy);
        assert_eq!(Element::Wood.relation_to(Element::Earth), ElementRelation::Overcomes);
        assert_eq!(Element::Earth.relation_to(Element::Wood), ElementRelation::OvercomeBy);
        assert_eq!(Element::Metal.relation_to(Element::Metal), ElementRelation::Same);
    }

    #[test]
    fn test_primes() {
        let primes: Vec<u8> = (1..=49).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]);
    }

    #[test]
    fn test_digit_helpers() {
        assert_eq!((head_of(37), tail_of(37)), (3, 7));
        assert_eq!((head_of(7), tail_of(7)), (0, 7));
        assert_eq!(zone_of(1), 0);
        assert_eq!(zone_of(7), 0);
        assert_eq!(zone_of(8), 1);
        assert_eq!(zone_of(49), 6);
        assert_eq!(digit_root(38), 2);
        assert_eq!(digit_root(9), 9);
        assert_eq!(digit_root(0), 0);
    }
}
