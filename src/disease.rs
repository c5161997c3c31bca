//! Static descriptive text for each tumor class
//!
//! Reviewed clinical summaries shown alongside a prediction. Never mutated
//! at runtime.

/// Descriptive information for one disease class.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseInfo {
    pub description: &'static str,
    pub cause: &'static str,
    pub treatment: &'static str,
    pub symptoms: &'static [&'static str],
    /// Example image filename under the disease-examples directory.
    pub example_image: Option<&'static str>,
}

const GLIOMA: DiseaseInfo = DiseaseInfo {
    description: "A tumor that starts in the support cells of the brain (called glial cells). Its seriousness depends on how aggressive the tumor cells are (their grade) and where the tumor is located.",
    cause: "Often due to random changes in cells' DNA. Sometimes previous head radiation can increase risk, but often the exact cause is unknown.",
    treatment: "Usually involves surgery to remove as much of the tumor as possible, followed by radiation therapy or chemotherapy depending on the tumor's grade.",
    symptoms: &[
        "Headaches",
        "Seizures",
        "Vision problems",
        "Balance problems",
        "Speech or memory issues",
    ],
    example_image: Some("glioma.jpg"),
};

const MENINGIOMA: DiseaseInfo = DiseaseInfo {
    description: "A usually non-cancerous tumor that grows from the meninges (the protective layers covering the brain and spinal cord). It often grows slowly, and its effects depend on the tumor's size and location.",
    cause: "Most occur by chance. Known risk factors include past head radiation and rare genetic conditions (like neurofibromatosis type 2).",
    treatment: "If small and not causing issues, the tumor may just be watched closely. Otherwise, it is often removed with surgery. Precise radiation (radiosurgery) may be used if needed.",
    symptoms: &[
        "Headaches",
        "Seizures",
        "Vision or hearing changes",
        "Weakness or numbness",
    ],
    example_image: Some("meningioma.jpg"),
};

const PITUITARY: DiseaseInfo = DiseaseInfo {
    description: "Most are benign growths (adenomas) in the pituitary gland, a small hormone-producing gland at the base of the brain. These tumors can cause hormone changes or press on nerves that affect vision.",
    cause: "Often no known cause. Rarely, inherited endocrine conditions (like MEN1 syndrome) can lead to pituitary tumors.",
    treatment: "Small, symptom-free tumors may be monitored. If the tumor produces too much hormone, medications can help. Surgery or radiation is recommended for tumors that are large or causing symptoms.",
    symptoms: &[
        "Headaches",
        "Peripheral vision loss",
        "Hormone-related changes (e.g., menstrual irregularities or weight changes)",
        "Fatigue",
    ],
    example_image: Some("pituitary_adenoma.jpg"),
};

const NO_TUMOR: DiseaseInfo = DiseaseInfo {
    description: "No tumor was found on the MRI scan. The brain tissue appears healthy and normal.",
    cause: "Not applicable (normal brain).",
    treatment: "No treatment needed; follow normal health guidance.",
    symptoms: &["None"],
    example_image: Some("no_tumor.jpg"),
};

/// Empty entry used for labels without curated text (e.g. `Class_5` from a
/// mismatched model).
const UNKNOWN: DiseaseInfo = DiseaseInfo {
    description: "",
    cause: "",
    treatment: "",
    symptoms: &[],
    example_image: None,
};

/// Look up the descriptive entry for a display label.
pub fn lookup(label: &str) -> &'static DiseaseInfo {
    match label {
        "Glioma" => &GLIOMA,
        "Meningioma" => &MENINGIOMA,
        "Pituitary" => &PITUITARY,
        "No Tumor" => &NO_TUMOR,
        _ => &UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_have_text() {
        for label in ["Glioma", "Meningioma", "Pituitary", "No Tumor"] {
            let info = lookup(label);
            assert!(!info.description.is_empty());
            assert!(!info.symptoms.is_empty());
            assert!(info.example_image.is_some());
        }
    }

    #[test]
    fn unknown_label_is_blank() {
        let info = lookup("Class_9");
        assert!(info.description.is_empty());
        assert!(info.example_image.is_none());
    }
}
