use std::fs;

const SECTIONS: [&str; 5] = ["style", "badge", "briefing", "email", "smtp"];
const TIERS: [&str; 3] = ["high", "medium", "low"];

fn main() {
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    for section in SECTIONS {
        if !table.get(section).is_some_and(toml::Value::is_table) {
            panic!("default_config.toml is missing the [{}] table", section);
        }
    }
    for section in table.keys().filter(|key| !SECTIONS.contains(&key.as_str())) {
        panic!("default_config.toml has unknown table [{}]", section);
    }

    let badge = &table["badge"];
    for tier in TIERS {
        if !badge.get(tier).is_some_and(toml::Value::is_table) {
            panic!("default_config.toml is missing the [badge.{}] table", tier);
        }
    }
}
