//! Built-in SciRAP in vitro checklist keywords (RQ1-RQ24, MQ1-MQ16, R1-R4)

use super::schema::{ChecklistDef, CriterionDef, DefaultTierDef, RuleSet, TierDef};
use crate::analyzer::RatingThresholds;
use crate::{Module, TierKind};

fn tier(kind: TierKind, label: &str, score: f64, keywords: &[&str]) -> TierDef {
    TierDef {
        kind,
        label: label.to_string(),
        score,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn default_tier(label: &str) -> DefaultTierDef {
    DefaultTierDef {
        label: label.to_string(),
        score: 0.0,
    }
}

/// Reporting quality item: strong evidence, then weak evidence
fn rq(id: &str, question: &str, strong: &[&str], weak: &[&str]) -> CriterionDef {
    CriterionDef {
        id: id.to_string(),
        question: question.to_string(),
        tiers: vec![
            tier(TierKind::Strong, "Fulfilled", 1.0, strong),
            tier(TierKind::Weak, "Partially fulfilled", 0.5, weak),
        ],
        default: default_tier("Not reported"),
    }
}

/// Methodological quality item: a contradiction outranks any positive evidence
fn mq(
    id: &str,
    question: &str,
    strong: &[&str],
    weak: &[&str],
    contradict: &[&str],
) -> CriterionDef {
    CriterionDef {
        id: id.to_string(),
        question: question.to_string(),
        tiers: vec![
            tier(TierKind::Contradict, "Not fulfilled", 0.0, contradict),
            tier(TierKind::Strong, "Fulfilled", 1.0, strong),
            tier(TierKind::Weak, "Partially fulfilled", 0.5, weak),
        ],
        default: default_tier("Not reported"),
    }
}

/// Relevance item: exclusion terms outrank direct and indirect relevance
fn rel(
    id: &str,
    question: &str,
    direct: &[&str],
    indirect: &[&str],
    excluded: &[&str],
) -> CriterionDef {
    CriterionDef {
        id: id.to_string(),
        question: question.to_string(),
        tiers: vec![
            tier(TierKind::Excluded, "Not relevant", 0.0, excluded),
            tier(TierKind::Direct, "Directly relevant", 1.0, direct),
            tier(TierKind::Indirect, "Indirectly relevant", 0.5, indirect),
        ],
        default: default_tier("Not relevant"),
    }
}

#[rustfmt::skip]
fn reporting_quality() -> ChecklistDef {
    let criteria = vec![
        rq("RQ1", "Chemical name or identification was given",
            &["cas", "chemical name", "cas number", "iupac", "molecular formula", "structure"],
            &["test compound", "compound", "chemical obtained", "purchased from"]),
        rq("RQ2", "Purity was stated or traceable",
            &["high purity", "certificate of analysis", "hplc", "99%", "batch number", "lot number"],
            &["purity", "purchased from", "supplied by"]),
        rq("RQ3", "Solubility was described",
            &["solubility", "soluble in", "solubility test"],
            &["dissolved", "prepared in"]),
        rq("RQ4", "Solvent (vehicle) was described",
            &["dmso", "ethanol", "pbs", "solvent", "vehicle"],
            &["carrier"]),
        rq("RQ5", "Solvent (vehicle) control included",
            &["vehicle control", "solvent control"],
            &["control group"]),
        rq("RQ6", "Test system described",
            &["cell line", "primary cells", "tissue", "organ culture", "embryo"],
            &["cells used", "in vitro model"]),
        rq("RQ7", "Source of test system stated",
            &["atcc", "supplier", "catalog number", "cat no"],
            &["obtained from", "purchased from"]),
        rq("RQ8", "Metabolic competence described",
            &["cyp450", "s9 fraction", "metabolic activation"],
            &["metabolize", "biotransformation"]),
        rq("RQ9", "Cell passage number stated",
            &["passage", "passage no", "passage number"],
            &["subcultured"]),
        rq("RQ10", "Media composition described",
            &["dmem", "rpmi", "fbs", "serum", "antibiotic"],
            &["media", "culture medium"]),
        rq("RQ11", "Incubation conditions described",
            &["37c", "co2", "humidity", "incubator"],
            &["room temperature"]),
        rq("RQ12", "Contamination control described",
            &["mycoplasma", "contamination check", "sterility test"],
            &["sterile conditions"]),
        rq("RQ13", "Dose levels stated",
            &["um", "mm", "mg ml", "concentration", "dose"],
            &["treated with"]),
        rq("RQ14", "Cell density or number stated",
            &["cells well", "seeding density", "cell density"],
            &["cells plated"]),
        rq("RQ15", "Duration of treatment stated",
            &["24h", "48h", "72h", "exposure time"],
            &["overnight"]),
        rq("RQ16", "Number of replicates stated",
            &["replicates", "n=", "triplicate", "independent"],
            &["repeated"]),
        rq("RQ17", "Methods sufficiently described",
            &["protocol", "procedure", "assay method", "analytical method"],
            &["as previously described"]),
        rq("RQ18", "Time points stated",
            &["time point", "collected at", "measured at"],
            &["over time"]),
        rq("RQ19", "Cytotoxicity measured",
            &["mtt", "viability", "cytotoxicity", "ldh"],
            &["cell death"]),
        rq("RQ20", "Results clearly presented",
            &["figure", "table", "results"],
            &["data shown"]),
        rq("RQ21", "Statistical methods described",
            &["anova", "t test", "p value", "graphpad"],
            &["statistics"]),
        rq("RQ22", "Funding sources stated",
            &["funded by", "supported by", "grant"],
            &["financial support"]),
        rq("RQ23", "Competing interests disclosed",
            &[
                "no conflict of interest",
                "no conflicts of interest",
                "the authors declare no conflict",
                "the authors declare that they have no conflict of interest",
                "no competing interests",
                "none declared",
                "no financial conflict",
                "no competing financial interests",
            ],
            &["conflict of interest", "competing interest"]),
        // Judged by the assessor; keyword evidence cannot establish it
        rq("RQ24", "Indispensable information provided", &[], &[]),
    ];
    ChecklistDef {
        module: Module::Reporting,
        criteria,
    }
}

#[rustfmt::skip]
fn methodological_quality() -> ChecklistDef {
    let criteria = vec![
        mq("MQ1", "Impurities unlikely to affect results",
            &["high purity", "hplc", "99%", "no impurities"],
            &["purity", "batch", "lot number"],
            &["impurities", "unknown purity"]),
        mq("MQ2", "Compound likely soluble",
            &["soluble", "solubility", "fully dissolved"],
            &["dissolved"],
            &["insoluble", "precipitate"]),
        mq("MQ3", "Appropriate solvent used",
            &["dmso", "ethanol", "pbs"],
            &["solvent"],
            &["toxic solvent"]),
        mq("MQ4", "Solvent control included",
            &["vehicle control", "solvent control"],
            &["control group"],
            &["no control"]),
        mq("MQ5", "Positive control included + expected effect",
            &["positive control", "reference compound", "expected response"],
            &["positive"],
            &["no positive control", "failed positive control"]),
        mq("MQ6", "Reliable + sensitive test system",
            &["validated model", "sensitive assay", "cyp450"],
            &["cell line", "primary cells"],
            &["unreliable"]),
        mq("MQ7", "Maintenance conditions appropriate",
            &["37c", "co2", "dmem", "fbs", "mycoplasma free"],
            &["incubation", "media"],
            &["contamination"]),
        mq("MQ8", "Exposure duration suitable",
            &["24h", "48h", "72h"],
            &["treated for"],
            &["insufficient exposure"]),
        mq("MQ9", "Concentrations suitable",
            &["dose response", "range finding", "multiple concentrations"],
            &["treated with"],
            &["irrelevant concentration", "excessive toxicity"]),
        mq("MQ10", "Test conditions appropriate",
            &["appropriate media", "serum", "cell density", "temperature"],
            &["culture"],
            &["inappropriate conditions"]),
        mq("MQ11", "Reliable analytical methods used",
            &["validated method", "sensitivity", "lod", "standard method"],
            &["method", "protocol"],
            &["unvalidated"]),
        mq("MQ12", "Sufficient replicates",
            &["n=", "triplicate", "biological replicates"],
            &["replicated"],
            &["n=1", "single replicate"]),
        mq("MQ13", "Suitable time points",
            &["time course", "measured at", "multiple time points"],
            &["over time"],
            &["inadequate time points"]),
        mq("MQ14", "Cytotoxicity measured & acceptable",
            &["mtt", "viability", "cytotoxicity", "noncytotoxic"],
            &["cell death"],
            &["severe cytotoxicity"]),
        mq("MQ15", "Statistical methods appropriate",
            &["anova", "t test", "p value"],
            &["statistics"],
            &["inappropriate statistics"]),
        mq("MQ16", "Other reliability factors",
            &["quality control", "validated"],
            &["reliable"],
            &["bias", "experimental flaw"]),
    ];
    ChecklistDef {
        module: Module::Methodological,
        criteria,
    }
}

#[rustfmt::skip]
fn relevance() -> ChecklistDef {
    let criteria = vec![
        rel("R1", "Identity of the tested substance",
            &[
                "pesticide", "insecticide", "herbicide", "fungicide",
                "endocrine disruptor", "bisphenol", "phthalate", "flame retardant",
                "metal", "lead", "arsenic", "cadmium", "mercury",
            ],
            &["industrial chemical", "environmental toxicant", "pollution exposure"],
            &[
                "pharmaceutical drug", "antidepressant", "vitamin",
                "nutraceutical", "nanomaterial", "hormone therapy", "food additive",
            ]),
        rel("R2", "Test system used",
            &[
                "oligodendrocyte", "opc", "myelination", "cns development",
                "prenatal", "perinatal", "early life", "white matter",
                "developmental neurotoxicity",
            ],
            &["neuron culture", "mixed glia", "primary brain cells"],
            &[
                "cancer cell line", "glioblastoma", "hepg2", "a549",
                "alzheimer", "parkinson", "ms", "adult neurodegeneration",
            ]),
        rel("R3", "Endpoint studied",
            &[
                "myelin", "mbp", "olig2", "apoptosis", "oxidative stress",
                "mitochondrial dysfunction", "ros", "cytokine",
                "inflammation", "neurite outgrowth", "cell differentiation",
                "developmental toxicity",
            ],
            &["neurotoxicity", "viability", "cytotoxicity", "gene expression"],
            &[
                "cancer proliferation", "tumor marker",
                "alzheimer marker", "parkinson marker", "metabolic disease",
            ]),
        rel("R4", "Concentrations used",
            &["nm", "\u{b5}m", "low dose", "physiological dose"],
            &["high \u{b5}m", "supraphysiological dose"],
            &["mm", "millimolar", "extremely high dose", "cytotoxic concentration"]),
    ];
    ChecklistDef {
        module: Module::Relevance,
        criteria,
    }
}

/// The SciRAP in vitro rule set shipped with the tool
pub fn scirap_rule_set() -> RuleSet {
    RuleSet {
        version: super::schema::RULE_SET_VERSION,
        checklists: vec![reporting_quality(), methodological_quality(), relevance()],
        thresholds: RatingThresholds::default(),
    }
}
