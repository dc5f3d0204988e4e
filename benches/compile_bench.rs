//! Compile Benchmark
//!
//! Measures parse, lowering and compile throughput (bytes/sec) of the whole
//! pipeline on generated declaration files.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ts2py::{Compatibility, PythonVersion, compile_source};
use ts2py_parser::{LowerOptions, ParserState, lower};

// =============================================================================
// Test Sources
// =============================================================================

const PROTOCOL_SOURCE: &str = r#"
interface Position {
    line: uinteger;
    character: uinteger;
}

interface Range {
    start: Position;
    end: Position;
}

namespace DiagnosticSeverity {
    export const Error: 1 = 1;
    export const Warning: 2 = 2;
    export const Information: 3 = 3;
    export const Hint: 4 = 4;
}

export type DiagnosticSeverity = 1 | 2 | 3 | 4;

export interface Diagnostic {
    range: Range;
    severity?: DiagnosticSeverity;
    code?: integer | string;
    source?: string;
    message: string;
    relatedInformation?: DiagnosticRelatedInformation[];
    data?: { [key: string]: any };
}

export interface DiagnosticRelatedInformation {
    location: Location;
    message: string;
}

export interface Location {
    uri: string;
    range: Range;
}

export interface WorkDoneProgressBegin {
    kind: 'begin';
    title: string;
    cancellable?: boolean;
    percentage?: uinteger;
}
"#;

/// Generate a source with many interconnected records.
fn generate_records(records: usize, fields: usize) -> String {
    let mut source = String::with_capacity(records * fields * 40);
    for r in 0..records {
        source.push_str(&format!("export interface Record{r} {{\n"));
        for f in 0..fields {
            let ty = match f % 4 {
                0 => "string".to_string(),
                1 => "number[]".to_string(),
                2 => format!("Record{} | null", (r + 1) % records),
                _ => "{ nested: boolean; label?: string }".to_string(),
            };
            let optional = if f % 3 == 0 { "?" } else { "" };
            source.push_str(&format!("    field{f}{optional}: {ty};\n"));
        }
        source.push_str("}\n\n");
    }
    source
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_parse_protocol(c: &mut Criterion) {
    c.bench_function("parse_and_lower_protocol", |b| {
        b.iter(|| {
            let mut parser =
                ParserState::new("bench.d.ts".to_string(), PROTOCOL_SOURCE.to_string());
            let root = parser.parse_source_file();
            let (arena, _) = parser.into_parts();
            black_box(lower(&arena, root, "bench.d.ts", LowerOptions::default()))
        })
    });
}

fn bench_compile_protocol(c: &mut Criterion) {
    let baseline = Compatibility::default();
    let modern = Compatibility::for_python_version(PythonVersion::new(3, 12))
        .expect("3.12 is a valid preset");
    c.bench_function("compile_protocol_baseline", |b| {
        b.iter(|| black_box(compile_source(PROTOCOL_SOURCE, "bench.d.ts", &baseline)))
    });
    c.bench_function("compile_protocol_py312", |b| {
        b.iter(|| black_box(compile_source(PROTOCOL_SOURCE, "bench.d.ts", &modern)))
    });
}

fn bench_compile_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_throughput");
    let compat = Compatibility::default();

    for (records, fields) in [(10, 8), (50, 8), (200, 12)].iter() {
        let source = generate_records(*records, *fields);
        let label = format!("{records}rec_{fields}fld");

        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("compile", &label), &source, |b, source| {
            b.iter(|| black_box(compile_source(source, "bench.d.ts", &compat)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_protocol,
    bench_compile_protocol,
    bench_compile_throughput
);
criterion_main!(benches);
