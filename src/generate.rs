//! Deterministic synthetic corpus and query generation.
//!
//! Every generator takes the random source explicitly; the same seed always
//! yields the same corpus and the same query list.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dataset::Item;
use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Tech,
    Medical,
    Pharmaceutical,
    HealthInsurance,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Tech,
        Domain::Medical,
        Domain::Pharmaceutical,
        Domain::HealthInsurance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Tech => "tech",
            Domain::Medical => "medical",
            Domain::Pharmaceutical => "pharmaceutical",
            Domain::HealthInsurance => "health_insurance",
        }
    }
}

/// Relative domain weights. Normalized before use, so `1,1,1,1` and
/// `0.25,0.25,0.25,0.25` are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainMix {
    pub tech: f64,
    pub medical: f64,
    pub pharmaceutical: f64,
    pub health_insurance: f64,
}

impl Default for DomainMix {
    fn default() -> Self {
        Self {
            tech: 0.25,
            medical: 0.25,
            pharmaceutical: 0.25,
            health_insurance: 0.25,
        }
    }
}

impl DomainMix {
    pub fn weight(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Tech => self.tech,
            Domain::Medical => self.medical,
            Domain::Pharmaceutical => self.pharmaceutical,
            Domain::HealthInsurance => self.health_insurance,
        }
    }

    /// Weights scaled to sum to 1, in `Domain::ALL` order.
    pub fn normalized(&self) -> Result<[(Domain, f64); 4]> {
        let weights = Domain::ALL.map(|d| (d, self.weight(d)));
        if let Some((d, w)) = weights.iter().find(|(_, w)| !(*w >= 0.0) || !w.is_finite()) {
            return Err(BenchError::Validation(format!(
                "domain weight for {} must be a finite non-negative number, got {w}",
                d.as_str()
            )));
        }
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(BenchError::Validation(
                "at least one domain weight must be positive".to_string(),
            ));
        }
        Ok(weights.map(|(d, w)| (d, w / total)))
    }

    /// Split `n` across domains: floor of each share, then the remainder one
    /// apiece to the leading domains.
    pub fn allocate(&self, n: usize) -> Result<[(Domain, usize); 4]> {
        let normalized = self.normalized()?;
        let mut counts = normalized.map(|(d, w)| (d, (n as f64 * w) as usize));
        let assigned: usize = counts.iter().map(|(_, c)| c).sum();
        for (_, count) in counts.iter_mut().take(n.saturating_sub(assigned)) {
            *count += 1;
        }
        Ok(counts)
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Corpus ─────────────────────────────────────────────────────────────────

/// Generate `n` items across domains. Identifiers run `0..n` in domain order.
pub fn generate_corpus(n: usize, mix: &DomainMix, rng: &mut StdRng) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(n);
    let mut next_id = 0u64;

    for (domain, count) in mix.allocate(n)? {
        for index in 0..count {
            let (title, description, metadata) = match domain {
                Domain::Tech => tech_item(index, rng),
                Domain::Medical => medical_item(index),
                Domain::Pharmaceutical => pharmaceutical_item(index),
                Domain::HealthInsurance => insurance_item(index, rng),
            };
            items.push(Item {
                id: next_id,
                domain: domain.as_str().to_string(),
                title,
                description,
                metadata: match metadata {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                },
                extra: serde_json::Map::new(),
            });
            next_id += 1;
        }
    }

    Ok(items)
}

type ItemText = (String, String, serde_json::Value);

fn tech_item(i: usize, rng: &mut StdRng) -> ItemText {
    const LANGUAGES: [&str; 14] = [
        "Python", "JavaScript", "Java", "C++", "Ruby", "Go", "Rust", "TypeScript", "Kotlin",
        "Swift", "PHP", "C#", "Scala", "R",
    ];
    const TOPICS: [&str; 17] = [
        "web development", "data science", "machine learning", "algorithms", "system design",
        "testing", "security", "DevOps", "mobile apps", "game development", "embedded systems",
        "cloud computing", "AI/ML", "blockchain", "microservices", "containerization",
        "API design",
    ];
    const INTROS: [&str; 12] = [
        "Comprehensive guide to", "Learn", "Master", "Deep dive into",
        "Practical introduction to", "Advanced techniques for", "Getting started with",
        "Professional", "Essential", "Complete", "Hands-on", "Modern approach to",
    ];
    const DETAILS: [&str; 9] = [
        "Covers practical examples, best practices, and real-world applications.",
        "Includes hands-on projects and code samples throughout.",
        "Features expert insights and industry-tested patterns.",
        "Step-by-step tutorials with detailed explanations.",
        "Real-world case studies and production-ready code.",
        "Comprehensive coverage from basics to advanced concepts.",
        "Interactive exercises and project-based learning.",
        "Industry-standard techniques and cutting-edge practices.",
        "Battle-tested solutions for modern development challenges.",
    ];
    const AUDIENCES: [&str; 7] = [
        "Suitable for intermediate developers",
        "Perfect for beginners and intermediate programmers",
        "Designed for experienced developers",
        "Ideal for software engineers",
        "Great for aspiring professionals",
        "Built for self-learners and bootcamp students",
        "Tailored for enterprise developers",
    ];

    let lang = LANGUAGES[i % LANGUAGES.len()];
    let topic = TOPICS[(i / LANGUAGES.len()) % TOPICS.len()];
    let intro = pick(rng, &INTROS);
    let detail = pick(rng, &DETAILS);
    let audience = pick(rng, &AUDIENCES);
    let edition = i / (LANGUAGES.len() * TOPICS.len()) + 1;
    let difficulty = ["beginner", "intermediate", "advanced"][i % 3];

    (
        format!("{lang} for {} - Edition {edition}", title_case(topic)),
        format!(
            "{intro} {lang} programming with focus on {topic}. {detail} {audience} looking to master {topic}."
        ),
        json!({
            "language": lang,
            "topic": topic,
            "edition": edition,
            "pages": 200 + (i * 7) % 300,
            "difficulty": difficulty,
            "year": 2020 + i % 5,
        }),
    )
}

fn medical_item(i: usize) -> ItemText {
    const SPECIALTIES: [&str; 14] = [
        "Cardiology", "Neurology", "Oncology", "Pediatrics", "Surgery", "Radiology",
        "Psychiatry", "Dermatology", "Orthopedics", "Endocrinology", "Gastroenterology",
        "Pulmonology", "Nephrology", "Rheumatology",
    ];
    const TOPICS: [&str; 11] = [
        "diagnosis", "treatment protocols", "patient management", "clinical practice",
        "surgical techniques", "emergency medicine", "preventive care", "pathology",
        "pharmacotherapy", "diagnostic imaging", "interventional procedures",
    ];
    const FORMATS: [&str; 9] = [
        "Textbook", "Clinical Guide", "Reference Manual", "Handbook", "Atlas", "Case Studies",
        "Review", "Protocols", "Guidelines",
    ];
    const AUDIENCES: [&str; 6] = [
        "medical students", "residents", "practicing physicians", "specialists",
        "healthcare professionals", "clinical researchers",
    ];

    let specialty = SPECIALTIES[i % SPECIALTIES.len()];
    let topic = TOPICS[(i / SPECIALTIES.len()) % TOPICS.len()];
    let format = FORMATS[i % FORMATS.len()];
    let audience = AUDIENCES[i % AUDIENCES.len()];
    let edition = i / (SPECIALTIES.len() * 2) + 1;

    (
        format!("{specialty} {format}: {} - {edition}th Edition", title_case(topic)),
        format!(
            "Comprehensive {} resource covering {topic}. \
             Evidence-based approach with latest research and clinical guidelines. \
             Designed for {audience} with practical applications and case examples. \
             Updated with current standards of care and treatment recommendations.",
            specialty.to_lowercase()
        ),
        json!({
            "specialty": specialty,
            "topic": topic,
            "format": format,
            "edition": edition,
            "pages": 400 + (i * 11) % 600,
            "audience": audience,
            "year": 2018 + i % 7,
            "peer_reviewed": i % 2 == 0,
        }),
    )
}

fn pharmaceutical_item(i: usize) -> ItemText {
    const CLASSES: [&str; 12] = [
        "Antibiotic", "Antihypertensive", "Analgesic", "Antidepressant", "Anticoagulant",
        "Bronchodilator", "Antihistamine", "Antidiarrheal", "Immunosuppressant",
        "Anticonvulsant", "Antiviral", "Statin",
    ];
    const CONDITIONS: [&str; 12] = [
        "bacterial infections", "hypertension", "chronic pain", "depression", "blood clots",
        "asthma", "allergies", "type 2 diabetes", "autoimmune disorders", "epilepsy",
        "viral infections", "high cholesterol",
    ];
    const FORMS: [&str; 9] = [
        "tablet", "capsule", "injection", "syrup", "inhaler", "topical cream",
        "extended-release", "sublingual", "transdermal patch",
    ];
    const PREFIXES: [&str; 10] = ["Ama", "Ben", "Car", "Dex", "Epo", "Flu", "Gab", "Hyd", "Ibu", "Ket"];
    const SUFFIXES: [&str; 9] = ["pine", "zole", "cin", "pril", "statin", "mab", "tinib", "oxin", "phen"];
    const DOSAGES: [&str; 7] = ["10mg", "25mg", "50mg", "100mg", "200mg", "500mg", "1g"];

    let class = CLASSES[i % CLASSES.len()];
    let condition = CONDITIONS[i % CONDITIONS.len()];
    let form = FORMS[i % FORMS.len()];
    let name = format!(
        "{}{}",
        PREFIXES[i % PREFIXES.len()],
        SUFFIXES[(i / PREFIXES.len()) % SUFFIXES.len()]
    );
    let dosage = DOSAGES[i % DOSAGES.len()];

    (
        format!("{name} {dosage} - {class} ({form})"),
        format!(
            "{class} medication used for treatment of {condition}. \
             Available in {form} form. Mechanism of action targets specific pathways. \
             Prescribed for adult patients under medical supervision. \
             Standard dosing with documented efficacy and safety profile."
        ),
        json!({
            "drug_class": class,
            "condition": condition,
            "dosage": dosage,
            "form": form,
            "generic_name": name.to_lowercase(),
            "prescription_required": i % 3 != 0,
            "controlled_substance": i % 5 == 0,
        }),
    )
}

fn insurance_item(i: usize, rng: &mut StdRng) -> ItemText {
    const PLAN_TYPES: [&str; 6] = ["HMO", "PPO", "EPO", "POS", "HDHP", "Catastrophic"];
    const TIERS: [&str; 4] = ["Bronze", "Silver", "Gold", "Platinum"];
    const COVERAGE: [&str; 6] = [
        "Individual", "Family", "Medicare Supplement", "Short-term", "Employer Group", "Student",
    ];
    const FEATURES: [&str; 12] = [
        "preventive care coverage", "prescription drug coverage", "mental health services",
        "dental and vision options", "telehealth services", "wellness programs",
        "specialist access", "emergency services", "hospitalization coverage",
        "maternity care", "rehabilitation services", "chronic disease management",
    ];
    const DEDUCTIBLES: [u32; 7] = [1000, 2000, 3000, 4000, 5000, 6000, 7500];
    const NETWORKS: [&str; 4] = ["Small", "Medium", "Large", "National"];

    let plan = PLAN_TYPES[i % PLAN_TYPES.len()];
    let tier = TIERS[i % TIERS.len()];
    let coverage = COVERAGE[i % COVERAGE.len()];
    let features: Vec<&str> = FEATURES
        .choose_multiple(rng, 3 + i % 3)
        .copied()
        .collect();
    let deductible = DEDUCTIBLES[i % DEDUCTIBLES.len()];
    let network = NETWORKS[i % NETWORKS.len()];

    (
        format!("{tier} {plan} - {coverage} Health Insurance Plan"),
        format!(
            "{tier} tier {plan} health insurance plan for {} coverage. \
             Includes {}. \
             ${deductible} annual deductible with comprehensive network access. \
             Designed to balance affordability with quality healthcare access.",
            coverage.to_lowercase(),
            features.join(", ")
        ),
        json!({
            "plan_type": plan,
            "tier": tier,
            "coverage_type": coverage,
            "deductible": deductible,
            "features": features,
            "network_size": network,
        }),
    )
}

// ── Queries ────────────────────────────────────────────────────────────────

/// Generate exactly `n` search strings across domains.
///
/// Each domain gets the floor of its share; leftover slots go to domains
/// drawn at random among those with a positive weight.
pub fn generate_queries(n: usize, mix: &DomainMix, rng: &mut StdRng) -> Result<Vec<String>> {
    let normalized = mix.normalized()?;
    let mut queries = Vec::with_capacity(n);

    for (domain, weight) in normalized {
        for _ in 0..(n as f64 * weight) as usize {
            queries.push(domain_query(domain, rng));
        }
    }

    let weighted: Vec<Domain> = normalized
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|(d, _)| *d)
        .collect();
    while queries.len() < n {
        let domain = weighted[rng.gen_range(0..weighted.len())];
        queries.push(domain_query(domain, rng));
    }

    queries.truncate(n);
    Ok(queries)
}

fn domain_query(domain: Domain, rng: &mut StdRng) -> String {
    match domain {
        Domain::Tech => tech_query(rng),
        Domain::Medical => medical_query(rng),
        Domain::Pharmaceutical => pharmaceutical_query(rng),
        Domain::HealthInsurance => insurance_query(rng),
    }
}

fn tech_query(rng: &mut StdRng) -> String {
    const TEMPLATES: [&str; 10] = [
        "{language} {topic} tutorial",
        "learn {language} programming {topic}",
        "{difficulty} {topic} and {topic2}",
        "{language} for {topic}",
        "{topic} best practices {language}",
        "advanced {topic} techniques",
        "{language} {topic} examples",
        "beginner guide to {language}",
        "{topic} patterns in {language}",
        "modern {language} development",
    ];
    const LANGUAGES: [&str; 7] = ["python", "javascript", "java", "rust", "go", "c++", "typescript"];
    const TOPICS: [&str; 9] = [
        "machine learning", "web development", "data science", "algorithms", "security",
        "testing", "cloud computing", "API design", "microservices",
    ];
    const DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

    let template = pick(rng, &TEMPLATES);
    let topic = pick(rng, &TOPICS);
    let others: Vec<&str> = TOPICS.iter().copied().filter(|t| *t != topic).collect();
    let topic2 = pick(rng, &others);
    template
        .replace("{language}", pick(rng, &LANGUAGES))
        .replace("{topic2}", topic2)
        .replace("{topic}", topic)
        .replace("{difficulty}", pick(rng, &DIFFICULTIES))
}

fn medical_query(rng: &mut StdRng) -> String {
    const TEMPLATES: [&str; 10] = [
        "{specialty} {topic} guide",
        "clinical {topic} for {specialty}",
        "{specialty} diagnosis and {topic}",
        "{topic} in {specialty} practice",
        "{specialty} patient {topic}",
        "evidence-based {specialty} {topic}",
        "{specialty} treatment protocols",
        "latest {specialty} research {topic}",
        "{topic} management in {specialty}",
        "{specialty} clinical guidelines",
    ];
    const SPECIALTIES: [&str; 9] = [
        "cardiology", "neurology", "oncology", "pediatrics", "surgery", "radiology",
        "psychiatry", "orthopedics", "emergency medicine",
    ];
    const TOPICS: [&str; 9] = [
        "treatment", "diagnosis", "management", "procedures", "guidelines", "case studies",
        "pharmacotherapy", "interventions", "protocols",
    ];

    pick(rng, &TEMPLATES)
        .replace("{specialty}", pick(rng, &SPECIALTIES))
        .replace("{topic}", pick(rng, &TOPICS))
}

fn pharmaceutical_query(rng: &mut StdRng) -> String {
    const TEMPLATES: [&str; 10] = [
        "{drug_class} for {condition}",
        "{condition} medication {form}",
        "{drug_class} side effects and dosing",
        "treatment for {condition}",
        "{form} medications for {condition}",
        "{drug_class} mechanism of action",
        "{condition} drug therapy",
        "prescription {drug_class}",
        "{drug_class} pharmacology",
        "{condition} pharmaceutical treatment",
    ];
    const CLASSES: [&str; 8] = [
        "antibiotic", "antihypertensive", "analgesic", "antidepressant", "anticoagulant",
        "bronchodilator", "antihistamine", "statin",
    ];
    const CONDITIONS: [&str; 9] = [
        "hypertension", "diabetes", "depression", "pain", "infection", "asthma", "allergies",
        "high cholesterol", "anxiety",
    ];
    const FORMS: [&str; 5] = ["tablet", "capsule", "injection", "inhaler", "syrup"];

    pick(rng, &TEMPLATES)
        .replace("{drug_class}", pick(rng, &CLASSES))
        .replace("{condition}", pick(rng, &CONDITIONS))
        .replace("{form}", pick(rng, &FORMS))
}

fn insurance_query(rng: &mut StdRng) -> String {
    const TEMPLATES: [&str; 10] = [
        "{tier} {plan_type} health insurance",
        "{coverage} health plan with {feature}",
        "affordable {plan_type} insurance",
        "{tier} tier health coverage",
        "{coverage} insurance with low deductible",
        "{plan_type} plans with {feature}",
        "comprehensive {coverage} coverage",
        "{tier} health insurance options",
        "{plan_type} with {feature} benefits",
        "best {tier} {coverage} plans",
    ];
    const TIERS: [&str; 4] = ["bronze", "silver", "gold", "platinum"];
    const PLAN_TYPES: [&str; 4] = ["HMO", "PPO", "EPO", "HDHP"];
    const COVERAGE: [&str; 4] = ["individual", "family", "employer", "student"];
    const FEATURES: [&str; 7] = [
        "prescription coverage", "dental", "vision", "mental health", "telehealth",
        "preventive care", "maternity",
    ];

    pick(rng, &TEMPLATES)
        .replace("{tier}", pick(rng, &TIERS))
        .replace("{plan_type}", pick(rng, &PLAN_TYPES))
        .replace("{coverage}", pick(rng, &COVERAGE))
        .replace("{feature}", pick(rng, &FEATURES))
}
