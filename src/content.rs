//! Static course text for the Waves course.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    Overview,
    Transverse,
    Longitudinal,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Overview, Topic::Transverse, Topic::Longitudinal];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "overview" => Some(Topic::Overview),
            "transverse" => Some(Topic::Transverse),
            "longitudinal" => Some(Topic::Longitudinal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Topic::Overview => "Wave Overview",
            Topic::Transverse => "Transverse Waves",
            Topic::Longitudinal => "Longitudinal Waves",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Panel {
    pub heading: &'static str,
    pub body: &'static [&'static str],
    /// Panel hosts the interactive wave lab.
    pub lab: bool,
}

const fn text(heading: &'static str, body: &'static [&'static str]) -> Panel {
    Panel { heading, body, lab: false }
}

const fn lab(heading: &'static str, intro: &'static [&'static str]) -> Panel {
    Panel { heading, body: intro, lab: true }
}

static OVERVIEW: [Panel; 5] = [
    text(
        "Wave Fundamentals",
        &[
            "A wave is a disturbance that travels through a medium, transferring energy without permanently displacing the medium itself.",
            "Amplitude (A): maximum displacement from equilibrium position.",
            "Frequency (f): number of complete cycles per second, measured in Hertz.",
            "Wavelength (λ): distance between consecutive identical points on the wave.",
            "Period (T): time for one complete cycle (T = 1/f).",
            "Wave Speed (v): how fast the wave travels (v = f × λ).",
            "Phase (φ): position of the wave in its cycle.",
        ],
    ),
    lab(
        "Interactive Wave Laboratory",
        &["Explore wave phenomena through hands-on simulations. Adjust parameters to see how they affect wave behavior."],
    ),
    text(
        "Wave Properties & Behavior",
        &[
            "Interference: when waves meet they combine by superposition. In phase they build a larger amplitude; out of phase they can cancel.",
            "Reflection: waves bounce back at a boundary, as in an echo or a mirror.",
            "Refraction: waves change direction passing from one medium to another, as light does in a prism.",
            "Diffraction: waves bend around obstacles and spread out through openings.",
        ],
    ),
    text(
        "Mathematical Foundation",
        &[
            "y(x,t) = A sin(2π(x/λ − ft) + φ)",
            "Wave speed: v = f × λ",
            "Period: T = 1/f",
            "Angular frequency: ω = 2πf",
            "Wave number: k = 2π/λ",
        ],
    ),
    text(
        "Real-World Applications",
        &[
            "Sound & music: frequency, amplitude and harmonics in instruments and audio.",
            "Communication: radio, microwaves and optical fibre.",
            "Medical imaging: ultrasound, MRI and X-rays.",
            "Oceanography: ocean waves, tides and tsunami prediction.",
            "Engineering: structures built to withstand seismic waves.",
            "Quantum physics: wave-particle duality and wave functions.",
        ],
    ),
];

static TRANSVERSE: [Panel; 4] = [
    text(
        "What are Transverse Waves?",
        &[
            "Particles of the medium oscillate perpendicular to the direction of propagation.",
            "They form crests and troughs. Light, water waves and string vibrations are examples, and they can be polarized.",
        ],
    ),
    lab(
        "Transverse Wave Simulation",
        &["Adjust amplitude, frequency and phase to see how they affect the wave pattern."],
    ),
    text(
        "Key Ideas",
        &[
            "Energy travels through the medium while individual particles oscillate in place.",
            "Energy passes from particle to particle through restoring forces.",
            "Particles move in simple harmonic motion.",
        ],
    ),
    text(
        "Mathematical Foundation",
        &[
            "y(x,t) = A sin(kx − ωt + φ)",
            "k = 2π/λ, ω = 2πf",
            "On a string: v = √(T/μ), with T the tension and μ the mass per unit length.",
        ],
    ),
];

static LONGITUDINAL: [Panel; 4] = [
    text(
        "What are Longitudinal Waves?",
        &[
            "Particles of the medium oscillate parallel to the direction of propagation, forming compressions and rarefactions.",
            "Sound, seismic P-waves and spring compressions are examples. They cannot travel through vacuum.",
        ],
    ),
    lab(
        "Longitudinal Wave Simulation",
        &["Observe how compressions and rarefactions travel through the medium."],
    ),
    text(
        "Key Ideas",
        &[
            "Regions of high pressure (compression) and low pressure (rarefaction) travel through the medium.",
            "Sound is a longitudinal pressure wave in air, water or solids.",
        ],
    ),
    text(
        "Mathematical Foundation",
        &[
            "P(x,t) = P₀ + ΔP sin(kx − ωt + φ)",
            "In air: v = √(γP/ρ), with γ the adiabatic index, P the pressure and ρ the density.",
        ],
    ),
];

pub fn panels(topic: Topic) -> &'static [Panel] {
    match topic {
        Topic::Overview => &OVERVIEW,
        Topic::Transverse => &TRANSVERSE,
        Topic::Longitudinal => &LONGITUDINAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_embeds_the_lab() {
        for t in Topic::ALL {
            assert_eq!(panels(t).iter().filter(|p| p.lab).count(), 1, "{:?}", t);
        }
    }

    #[test]
    fn topic_names_roundtrip() {
        for t in Topic::ALL {
            let name = serde_json::to_value(t).unwrap();
            assert_eq!(Topic::parse(name.as_str().unwrap()), Some(t));
        }
        assert_eq!(Topic::parse("quiz"), None);
    }
}
