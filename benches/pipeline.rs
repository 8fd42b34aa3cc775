use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hist_stacker::collect::SampleSet;
use hist_stacker::config::{ColorConfig, DisplayConfig, ScaleConfig};
use hist_stacker::histogram::Histogram;
use hist_stacker::stack::StackBuilder;

const SAMPLES: [&str; 6] = ["QCD", "TTbar", "DY", "WJets", "ST", "Diboson"];

fn sample_set(n_hists: usize, n_bins: usize) -> SampleSet {
    let edges = Histogram::uniform("edges", n_bins, 0.0, 100.0).unwrap().edges().to_vec();
    let mut set = SampleSet::default();
    for sample in SAMPLES.iter().copied().chain(["Data"]) {
        for h in 0..n_hists {
            let contents = (0..n_bins).map(|i| (i % 17) as f64 + 1.0).collect();
            set.insert(sample, Histogram::new(format!("h_var{h}"), edges.clone(), contents).unwrap());
        }
    }
    set
}

fn bench_stack(c: &mut Criterion) {
    let colors = ColorConfig::parse("QCD kRed + 1\nTTbar kBlue + 0\nDY kGreen + 0\n");
    let scales = ScaleConfig::parse("QCD 1.3\nTTbar 0.8\nDY 1.0\nWJets 2.0\n");
    let display = DisplayConfig::parse("h_var1 2 p_{T} [GeV]\nh_var 4\n");

    c.bench_function("display config + stack 50 hists", |b| {
        b.iter_batched(
            || sample_set(50, 100),
            |set| {
                let set = set.map_histograms(|h| display.apply(h));
                let builder = StackBuilder::new(&set, &colors, &scales);
                for name in set.plot_names() {
                    black_box(builder.build(&name));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("sum duplicate histograms", |b| {
        b.iter(|| black_box(sample_set(20, 200)))
    });
}

criterion_group!(benches, bench_stack);
criterion_main!(benches);
