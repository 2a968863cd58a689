//! Bootstrap script run by a launcher's embedded interpreter.

use crate::bundler::settings::CommandSpec;
use std::fmt::Write;

/// Quotes `value` as a single-quoted Python string literal.
pub fn python_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders the `__main__.py` placed inside a launcher.
///
/// The script puts the bundle's `pkgs` directory on `sys.path` and
/// `PYTHONPATH`, appends the interpreter directory to `PATH` so its DLLs
/// load, applies the command's environment, runs the extra preamble, and
/// exits with the entry point's return value.
pub fn render_bootstrap(command: &CommandSpec) -> String {
    let mut env = String::new();
    for (key, value) in &command.env {
        let _ = writeln!(
            env,
            "os.environ[{}] = {}",
            python_literal(key),
            python_literal(value)
        );
    }

    let module = &command.entry_point.module;
    let function = &command.entry_point.function;

    format!(
        r#"# -*- coding: utf-8 -*-
import sys, os
import site
installdir = os.path.dirname(os.path.dirname(sys.executable))
pkgdir = os.path.join(installdir, 'pkgs')
sys.path.insert(0, pkgdir)
# process .pth files shipped by packages
site.addsitedir(pkgdir)
os.environ['PYTHONPATH'] = pkgdir + os.pathsep + os.environ.get('PYTHONPATH', '')

# the interpreter's DLLs live next to python.exe
os.environ['PATH'] += ';' + os.path.dirname(sys.executable)

{env}
{preamble}

if __name__ == '__main__':
    from {module} import {function}
    sys.exit({function}())
"#,
        env = env.trim_end(),
        preamble = command.extra_preamble.trim_end(),
    )
}
