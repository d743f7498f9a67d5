use std::env;
use std::fs;

/// Fichero local con la configuración de la base de datos
const ENV_FILE: &str = ".env";
/// Solo las variables de la app pasan del .env al compilador
const ENV_PREFIX: &str = "REGISTRY_";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", ENV_FILE);

    let contents = match fs::read_to_string(ENV_FILE) {
        Ok(contents) => contents,
        Err(_) => {
            println!(
                "cargo:warning=No {} file found, the registry starts with its built-in defaults",
                ENV_FILE
            );
            return;
        }
    };

    // El entorno del proceso manda sobre el fichero
    for (key, value) in contents.lines().filter_map(registry_var) {
        if env::var_os(key).is_none() {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}

/// `REGISTRY_X = "valor"` → `("REGISTRY_X", "valor")`. Comentarios, líneas
/// vacías y claves ajenas a la app devuelven None.
fn registry_var(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    key.starts_with(ENV_PREFIX).then(|| (key, value.trim().trim_matches('"')))
}
