/*!

This is the long-form manual for `preflib_core` and the `preflib` command.

## Data types

The data type of a file is given by its extension:
* `soc`, `soi`, `toc`, `toi` ordinal data: strict or tied orders, complete or incomplete
* `tog`, `mjg`, `wmg`, `pwg` graphs: tournament, majority, weighted majority and pairwise graphs
* `wmd` weighted matching data
* `dat`, `csv` files kept as they are, only the basic counts apply to them

Blank lines are ignored everywhere. Alternatives are numbered from 1, exactly
as in the files.

### Ordinal data

```text
4
1,Alice
2,Bob
3,Charlie
4,Dave
5,5,2
3,{1,2},3
2,4
```

The first line is the number of alternatives, followed by one line per
alternative with its id and its name (the name may contain commas). The next
line holds the number of voters, the sum of the vote counts and the number of
unique orders. Each of the remaining lines is an order, preceded by the number
of voters who cast it. Alternatives ranked equally are grouped between braces.

In this example, three voters put Alice and Bob tied first and Charlie second,
and two voters only ranked Dave.

Repeated orders are merged and their counts added. The number of voters in the
header must match the sum of the counts. `soc` and `soi` files may not contain
ties, `soc` and `toc` orders must rank every alternative.

### Graphs

```text
3
1,Alice
2,Bob
3,Charlie
8,8,3
3,1,2
5,2,1
1,1,3
```

The header is the same as for ordinal data. Each remaining line is an edge,
written `weight,tail,head`. In a pairwise graph, the weight of `1 -> 2` is
the number of voters preferring 1 to 2.

### `wmd`

```text
3,12
1,a
2,b
3,c
1,2,7
2,3,-1
```

The first line holds the number of alternatives and the number of voters,
and there is no count line. Edges are written `tail,head,weight` and are
undirected: `1,2,7` also adds the edge `2 -> 1`.

## Properties

| Short name       | Applies to        |
|------------------|-------------------|
| `numAlt`         | all               |
| `numVot`         | all               |
| `sumVot`         | all               |
| `numUniq`        | all               |
| `isStrict`       | ordinal           |
| `isComplete`     | ordinal           |
| `isApproval`     | ordinal           |
| `largestBallot`  | ordinal           |
| `smallestBallot` | ordinal           |
| `maxNumIndif`    | ordinal           |
| `minNumIndif`    | ordinal           |
| `largestIndif`   | ordinal           |
| `smallestIndif`  | ordinal           |
| `isSP`           | `soc`             |
| `isSC`           | `soc`             |
| `hasCondorcet`   | graphs            |

`isSP` reports an axis on which the profile is single-peaked (alternatives
from left to right) or `false`. The test goes through a SAT solver. The
default backend learns clauses (`cdcl`). The built-in `dpll` backend is only
practical for a few dozen alternatives, but it can stop after a number of
decisions set with [SinglePeakedConfig](crate::SinglePeakedConfig).

## Configuration of `preflib`

`preflib` reads single files given with `--input`, or a JSON configuration:

```json
{
  "outputSettings": { "outputPath": "summary.json", "pretty": true },
  "dataFiles": [
    { "filePath": "00004-00000001.soc" },
    { "filePath": "notes.txt", "dataType": "dat" }
  ],
  "metadata": ["numAlt", "isSP", "isSC"],
  "rules": {
    "singlePeakedInitialColumns": 10,
    "singlePeakedColumnStep": 5,
    "singlePeakedSolver": "dpll",
    "solverMaxDecisions": 1000000
  }
}
```

Relative paths are resolved from the directory of the configuration file.
An empty `metadata` list computes every property that applies to each file.
A file that fails to parse is reported in the logs and skipped.

 */
